//! 소프트웨어 캔버스.
//!
//! `CanvasContext` 포트 구현. image::RgbaImage 위의 2D 즉시 모드 컨텍스트로,
//! 변환은 평행 이동만, 클립은 직사각형 하위 경로의 합집합만 지원한다.
//! 모든 그리기는 source-over 알파 블렌딩.

use image::RgbaImage;
use qrwatch_core::models::color::Rgba;
use qrwatch_core::models::frame::{FrameView, ImageData};
use qrwatch_core::ports::canvas::CanvasContext;
use tracing::{trace, warn};

/// 디바이스 좌표 정수 경계 `[x0, x1) × [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl Bounds {
    fn surface(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: i64::from(width),
            y1: i64::from(height),
        }
    }

    /// 픽셀 중심이 사각형 안에 들어오는 픽셀들의 경계. 음수 크기는 정규화.
    fn from_rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        let (left, right) = if w < 0.0 { (x + w, x) } else { (x, x + w) };
        let (top, bottom) = if h < 0.0 { (y + h, y) } else { (y, y + h) };
        Self {
            x0: (left - 0.5).ceil() as i64,
            y0: (top - 0.5).ceil() as i64,
            x1: (right - 0.5).ceil() as i64,
            y1: (bottom - 0.5).ceil() as i64,
        }
    }

    fn intersect(self, other: Bounds) -> Bounds {
        Bounds {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// 클립 영역 — 레이어 교집합, 레이어 내부는 합집합
#[derive(Debug, Clone, Default)]
struct Clip {
    layers: Vec<Vec<Bounds>>,
}

impl Clip {
    fn contains(&self, x: i64, y: i64) -> bool {
        self.layers
            .iter()
            .all(|layer| layer.iter().any(|b| b.contains(x, y)))
    }
}

/// `save`/`restore` 대상 상태
#[derive(Debug, Clone)]
struct DrawState {
    origin: (f32, f32),
    fill_style: Rgba,
    stroke_style: Rgba,
    line_width: f32,
    clip: Clip,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            origin: (0.0, 0.0),
            fill_style: Rgba::BLACK,
            stroke_style: Rgba::BLACK,
            line_width: 1.0,
            clip: Clip::default(),
        }
    }
}

/// 경로 요소 (디바이스 좌표)
#[derive(Debug, Clone, Copy)]
enum PathItem {
    Rect { x: f32, y: f32, w: f32, h: f32 },
    Line { from: (f32, f32), to: (f32, f32) },
}

/// image::RgbaImage 기반 캔버스
pub struct RgbaCanvas {
    image: RgbaImage,
    state: DrawState,
    stack: Vec<DrawState>,
    path: Vec<PathItem>,
    cursor: Option<(f32, f32)>,
}

impl RgbaCanvas {
    /// 투명 표면 생성
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
            path: Vec::new(),
            cursor: None,
        }
    }

    /// 현재 표면 픽셀
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// 저장된 상태 수 (테스트/진단용)
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    fn to_device(&self, x: f32, y: f32) -> (f32, f32) {
        (x + self.state.origin.0, y + self.state.origin.1)
    }

    fn surface_bounds(&self) -> Bounds {
        Bounds::surface(self.image.width(), self.image.height())
    }

    fn blend_at(&mut self, x: i64, y: i64, color: Rgba) {
        if !self.surface_bounds().contains(x, y) || !self.state.clip.contains(x, y) {
            return;
        }
        let idx = (y as usize * self.image.width() as usize + x as usize) * 4;
        let raw: &mut [u8] = &mut self.image;
        blend(&mut raw[idx..idx + 4], color);
    }

    fn stroke_segment(&mut self, from: (f32, f32), to: (f32, f32), half: f32, color: Rgba) {
        let bounds = Bounds {
            x0: (from.0.min(to.0) - half).floor() as i64,
            y0: (from.1.min(to.1) - half).floor() as i64,
            x1: (from.0.max(to.0) + half).ceil() as i64 + 1,
            y1: (from.1.max(to.1) + half).ceil() as i64 + 1,
        }
        .intersect(self.surface_bounds());

        if bounds.is_empty() {
            return;
        }

        let half_sq = half * half;
        for py in bounds.y0..bounds.y1 {
            for px in bounds.x0..bounds.x1 {
                let center = (px as f32 + 0.5, py as f32 + 0.5);
                if distance_sq_to_segment(center, from, to) <= half_sq {
                    self.blend_at(px, py, color);
                }
            }
        }
    }
}

impl CanvasContext for RgbaCanvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if self.image.dimensions() == (width, height) {
            let raw: &mut [u8] = &mut self.image;
            raw.fill(0);
        } else {
            trace!("캔버스 크기 변경: {}x{}", width, height);
            self.image = RgbaImage::new(width, height);
        }
        self.state = DrawState::default();
        self.stack.clear();
        self.path.clear();
        self.cursor = None;
    }

    fn draw_image(&mut self, frame: &FrameView<'_>, dx: i32, dy: i32, dw: u32, dh: u32) {
        if frame.width == 0 || frame.height == 0 || dw == 0 || dh == 0 {
            return;
        }
        if !frame.is_complete() {
            warn!(
                "불완전한 프레임 무시: {} 바이트 ({}x{})",
                frame.data.len(),
                frame.width,
                frame.height
            );
            return;
        }

        let x0 = i64::from(dx) + self.state.origin.0.round() as i64;
        let y0 = i64::from(dy) + self.state.origin.1.round() as i64;
        let target = Bounds {
            x0,
            y0,
            x1: x0 + i64::from(dw),
            y1: y0 + i64::from(dh),
        }
        .intersect(self.surface_bounds());

        if target.is_empty() {
            return;
        }

        let (fw, fh) = (u64::from(frame.width), u64::from(frame.height));
        for ty in target.y0..target.y1 {
            let sy = ((ty - y0) as u64 * fh / u64::from(dh)).min(fh - 1);
            for tx in target.x0..target.x1 {
                let sx = ((tx - x0) as u64 * fw / u64::from(dw)).min(fw - 1);
                let si = ((sy * fw + sx) * 4) as usize;
                let src = &frame.data[si..si + 4];
                self.blend_at(tx, ty, Rgba::new(src[0], src[1], src[2], src[3]));
            }
        }
    }

    fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> ImageData {
        let mut out = ImageData::new(w, h);
        let request = Bounds {
            x0: i64::from(x),
            y0: i64::from(y),
            x1: i64::from(x) + i64::from(w),
            y1: i64::from(y) + i64::from(h),
        };
        let visible = request.intersect(self.surface_bounds());
        if visible.is_empty() {
            return out;
        }

        let src_stride = self.image.width() as usize * 4;
        let dst_stride = w as usize * 4;
        let span = (visible.x1 - visible.x0) as usize * 4;
        let raw = self.image.as_raw();

        for row in visible.y0..visible.y1 {
            let src = row as usize * src_stride + visible.x0 as usize * 4;
            let dst = (row - request.y0) as usize * dst_stride + (visible.x0 - request.x0) as usize * 4;
            out.data[dst..dst + span].copy_from_slice(&raw[src..src + span]);
        }
        out
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.origin.0 += dx;
        self.state.origin.1 += dy;
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.cursor = None;
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x, y) = self.to_device(x, y);
        self.path.push(PathItem::Rect { x, y, w, h });
        self.cursor = Some((x, y));
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.cursor = Some(self.to_device(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let to = self.to_device(x, y);
        match self.cursor {
            Some(from) => self.path.push(PathItem::Line { from, to }),
            None => trace!("시작점 없는 line_to — 시작점으로 처리"),
        }
        self.cursor = Some(to);
    }

    fn clip(&mut self) {
        let layer: Vec<Bounds> = self
            .path
            .iter()
            .filter_map(|item| match *item {
                PathItem::Rect { x, y, w, h } => Some(Bounds::from_rect(x, y, w, h)),
                PathItem::Line { .. } => None,
            })
            .filter(|b| !b.is_empty())
            .collect();
        self.state.clip.layers.push(layer);
    }

    fn set_fill_style(&mut self, color: Rgba) {
        self.state.fill_style = color;
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x, y) = self.to_device(x, y);
        let bounds = Bounds::from_rect(x, y, w, h).intersect(self.surface_bounds());
        if bounds.is_empty() {
            return;
        }
        let color = self.state.fill_style;
        for py in bounds.y0..bounds.y1 {
            for px in bounds.x0..bounds.x1 {
                self.blend_at(px, py, color);
            }
        }
    }

    fn set_line_width(&mut self, width: f32) {
        // 0, 음수, NaN은 무시
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn set_stroke_style(&mut self, color: Rgba) {
        self.state.stroke_style = color;
    }

    fn stroke(&mut self) {
        let half = self.state.line_width / 2.0;
        let color = self.state.stroke_style;
        let segments: Vec<((f32, f32), (f32, f32))> = self
            .path
            .iter()
            .flat_map(|item| match *item {
                PathItem::Line { from, to } => vec![(from, to)],
                PathItem::Rect { x, y, w, h } => vec![
                    ((x, y), (x + w, y)),
                    ((x + w, y), (x + w, y + h)),
                    ((x + w, y + h), (x, y + h)),
                    ((x, y + h), (x, y)),
                ],
            })
            .collect();

        for (from, to) in segments {
            self.stroke_segment(from, to, half, color);
        }
    }
}

/// source-over 블렌딩 (8비트 직선 알파)
fn blend(dst: &mut [u8], src: Rgba) {
    let a = u32::from(src.a);
    if a == 0 {
        return;
    }
    let inv = 255 - a;
    let mix = |s: u8, d: u8| ((u32::from(s) * a + u32::from(d) * inv + 127) / 255) as u8;
    dst[0] = mix(src.r, dst[0]);
    dst[1] = mix(src.g, dst[1]);
    dst[2] = mix(src.b, dst[2]);
    dst[3] = (a + (u32::from(dst[3]) * inv + 127) / 255).min(255) as u8;
}

fn distance_sq_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (dx, dy) = (apx - t * abx, apy - t * aby);
    dx * dx + dy * dy
}
