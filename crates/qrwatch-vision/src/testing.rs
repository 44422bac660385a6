//! 테스트 전용 포트 구현 — 호출을 기록하는 캔버스, 고정 프레임 비디오, 스크립트 디코더.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use qrwatch_core::error::CoreError;
use qrwatch_core::models::color::Rgba;
use qrwatch_core::models::detection::{DecodeOptions, QrCode, QrLocation};
use qrwatch_core::models::frame::{FrameView, ImageData, ReadyState};
use qrwatch_core::models::geometry::Point;
use qrwatch_core::ports::canvas::CanvasContext;
use qrwatch_core::ports::decoder::{DecoderProvider, QrDecoder};
use qrwatch_core::ports::video::VideoSource;

// ── 캔버스 ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    SetSize(u32, u32),
    DrawImage(i32, i32, u32, u32),
    GetImageData(i32, i32, u32, u32),
    Save,
    Restore,
    Translate(f32, f32),
    BeginPath,
    Rect(f32, f32, f32, f32),
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Clip,
    SetFillStyle(Rgba),
    FillRect(f32, f32, f32, f32),
    SetLineWidth(f32),
    SetStrokeStyle(Rgba),
    Stroke,
}

/// 기록된 호출 목록 핸들 (캔버스를 넘긴 뒤에도 조회 가능)
#[derive(Debug, Clone, Default)]
pub struct CanvasLog {
    ops: Arc<Mutex<Vec<CanvasOp>>>,
}

impl CanvasLog {
    pub fn ops(&self) -> Vec<CanvasOp> {
        self.ops.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&CanvasOp) -> bool) -> usize {
        self.ops.lock().iter().filter(|op| pred(op)).count()
    }

    /// 표면 픽셀을 바꾸는 호출 수
    pub fn draw_count(&self) -> usize {
        self.count(|op| {
            matches!(
                op,
                CanvasOp::DrawImage(..) | CanvasOp::FillRect(..) | CanvasOp::Stroke
            )
        })
    }

    /// 획으로 그려진 선분 (변환 적용 후 표면 좌표)
    pub fn stroked_segments(&self) -> Vec<(Point, Point)> {
        let mut origin = (0.0f32, 0.0f32);
        let mut stack = Vec::new();
        let mut path = Vec::new();
        let mut cursor: Option<Point> = None;
        let mut stroked = Vec::new();

        for op in self.ops.lock().iter() {
            match *op {
                CanvasOp::Save => stack.push(origin),
                CanvasOp::Restore => origin = stack.pop().unwrap_or(origin),
                CanvasOp::Translate(dx, dy) => origin = (origin.0 + dx, origin.1 + dy),
                CanvasOp::BeginPath => {
                    path.clear();
                    cursor = None;
                }
                CanvasOp::MoveTo(x, y) => cursor = Some(Point::new(x + origin.0, y + origin.1)),
                CanvasOp::LineTo(x, y) => {
                    let end = Point::new(x + origin.0, y + origin.1);
                    if let Some(begin) = cursor {
                        path.push((begin, end));
                    }
                    cursor = Some(end);
                }
                CanvasOp::Stroke => stroked.extend(path.iter().copied()),
                _ => {}
            }
        }
        stroked
    }
}

/// 호출만 기록하는 캔버스. 픽셀 읽기는 투명 검정 버퍼를 돌려준다.
#[derive(Debug)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    origin: (f32, f32),
    saved: Vec<(f32, f32)>,
    log: CanvasLog,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> (Self, CanvasLog) {
        let log = CanvasLog::default();
        let canvas = Self {
            width,
            height,
            origin: (0.0, 0.0),
            saved: Vec::new(),
            log: log.clone(),
        };
        (canvas, log)
    }

    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }

    fn push(&self, op: CanvasOp) {
        self.log.ops.lock().push(op);
    }
}

impl CanvasContext for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.origin = (0.0, 0.0);
        self.saved.clear();
        self.push(CanvasOp::SetSize(width, height));
    }

    fn draw_image(&mut self, _frame: &FrameView<'_>, dx: i32, dy: i32, dw: u32, dh: u32) {
        self.push(CanvasOp::DrawImage(dx, dy, dw, dh));
    }

    fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> ImageData {
        self.push(CanvasOp::GetImageData(x, y, w, h));
        ImageData::new(w, h)
    }

    fn save(&mut self) {
        self.saved.push(self.origin);
        self.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        if let Some(origin) = self.saved.pop() {
            self.origin = origin;
        }
        self.push(CanvasOp::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.origin = (self.origin.0 + dx, self.origin.1 + dy);
        self.push(CanvasOp::Translate(dx, dy));
    }

    fn begin_path(&mut self) {
        self.push(CanvasOp::BeginPath);
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.push(CanvasOp::Rect(x, y, w, h));
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.push(CanvasOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(CanvasOp::LineTo(x, y));
    }

    fn clip(&mut self) {
        self.push(CanvasOp::Clip);
    }

    fn set_fill_style(&mut self, color: Rgba) {
        self.push(CanvasOp::SetFillStyle(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.push(CanvasOp::FillRect(x, y, w, h));
    }

    fn set_line_width(&mut self, width: f32) {
        self.push(CanvasOp::SetLineWidth(width));
    }

    fn set_stroke_style(&mut self, color: Rgba) {
        self.push(CanvasOp::SetStrokeStyle(color));
    }

    fn stroke(&mut self) {
        self.push(CanvasOp::Stroke);
    }
}

// ── 비디오 ───────────────────────────────────────────────

/// 테스트에서 바꿀 수 있는 비디오 상태
#[derive(Debug)]
pub struct VideoState {
    pub ready: ReadyState,
    pub play_calls: usize,
    pub fail_play: bool,
    pub detached: usize,
    pub ended: bool,
    /// 현재 해상도. 테스트 중 바꾸면 다음 프레임부터 적용된다 (회전 등).
    pub width: u32,
    pub height: u32,
}

/// 단색 고정 프레임 비디오
pub struct StaticVideo {
    frame: Vec<u8>,
    state: Arc<Mutex<VideoState>>,
}

impl StaticVideo {
    pub fn new(width: u32, height: u32) -> (Self, Arc<Mutex<VideoState>>) {
        let state = Arc::new(Mutex::new(VideoState {
            ready: ReadyState::HaveEnoughData,
            play_calls: 0,
            fail_play: false,
            detached: 0,
            ended: false,
            width,
            height,
        }));
        // 가로/세로가 뒤바뀌어도 담을 수 있는 크기
        let side = width.max(height) as usize;
        let video = Self {
            frame: vec![255; side * side * 4],
            state: state.clone(),
        };
        (video, state)
    }
}

impl VideoSource for StaticVideo {
    fn play(&mut self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        state.play_calls += 1;
        if state.fail_play {
            return Err(CoreError::Video("재생 거부".to_string()));
        }
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready
    }

    fn current_frame(&self) -> Option<FrameView<'_>> {
        let (width, height) = {
            let state = self.state.lock();
            (state.width, state.height)
        };
        let len = width as usize * height as usize * 4;
        Some(FrameView::new(self.frame.get(..len)?, width, height))
    }

    fn is_ended(&self) -> bool {
        self.state.lock().ended
    }

    fn detach(&mut self) {
        self.state.lock().detached += 1;
    }
}

// ── 디코더 ───────────────────────────────────────────────

/// 디코더 호출 기록 핸들
#[derive(Debug, Clone, Default)]
pub struct DecoderLog {
    calls: Arc<Mutex<Vec<(u32, u32, DecodeOptions)>>>,
}

impl DecoderLog {
    pub fn calls(&self) -> Vec<(u32, u32, DecodeOptions)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

/// 미리 정한 결과를 순서대로 돌려주는 디코더. 스크립트가 비면 `fallback`.
#[derive(Debug, Clone)]
pub struct ScriptedDecoder {
    script: Arc<Mutex<VecDeque<Option<QrCode>>>>,
    fallback: Option<QrCode>,
    decoder_log: DecoderLog,
}

impl ScriptedDecoder {
    pub fn always(result: Option<QrCode>) -> (Self, DecoderLog) {
        Self::scripted(Vec::new(), result)
    }

    pub fn scripted(script: Vec<Option<QrCode>>, fallback: Option<QrCode>) -> (Self, DecoderLog) {
        let decoder_log = DecoderLog::default();
        let decoder = Self {
            script: Arc::new(Mutex::new(script.into())),
            fallback,
            decoder_log: decoder_log.clone(),
        };
        (decoder, decoder_log)
    }
}

impl QrDecoder for ScriptedDecoder {
    fn decode(
        &self,
        _data: &[u8],
        width: u32,
        height: u32,
        options: &DecodeOptions,
    ) -> Option<QrCode> {
        self.decoder_log.calls.lock().push((width, height, *options));
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// `ScriptedDecoder`를 내주는 제공자. `fail`이면 초기화 오류.
pub struct MockProvider {
    decoder: ScriptedDecoder,
    fail: bool,
    loads: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(decoder: ScriptedDecoder) -> Self {
        Self {
            decoder,
            fail: false,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        let (decoder, _) = ScriptedDecoder::always(None);
        Self {
            decoder,
            fail: true,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecoderProvider for MockProvider {
    async fn load(&self) -> Result<Box<dyn QrDecoder>, CoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CoreError::DecoderInit("모듈 없음".to_string()));
        }
        Ok(Box::new(self.decoder.clone()))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// 10x10 정사각 코너를 가진 검출 결과
pub fn sample_code(data: &str) -> QrCode {
    QrCode {
        data: data.to_string(),
        binary_data: data.as_bytes().to_vec(),
        version: Some(1),
        location: QrLocation::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ),
    }
}
