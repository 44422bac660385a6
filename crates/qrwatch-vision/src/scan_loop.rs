//! 스캔 루프 드라이버.
//!
//! 화면 갱신마다 한 번 호출되는 자기 재예약 틱으로 동작한다.
//! 틱마다 비디오 프레임을 표면에 복사하고, 스캔 영역 바깥에 마스크를 덮고,
//! 최소 스캔 간격이 지났으면 디코드-보고 단계를 실행한 뒤 다음 틱을 예약한다.
//!
//! 틱은 호스트가 `on_frame`으로 하나씩 전달하므로 서로 겹치지 않는다.
//! 종료는 생존 플래그로 표시되며, 이미 큐에 들어간 틱도 진입 시 이 플래그를 먼저 확인한다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use qrwatch_core::config::AppConfig;
use qrwatch_core::error::CoreError;
use qrwatch_core::models::color::Rgba;
use qrwatch_core::models::frame::ReadyState;
use qrwatch_core::models::geometry::{Rect, ScanArea};
use qrwatch_core::ports::canvas::CanvasContext;
use qrwatch_core::ports::decoder::DecoderProvider;
use qrwatch_core::ports::scheduler::{FrameRequestId, FrameScheduler};
use qrwatch_core::ports::video::VideoSource;
use tracing::{debug, info, trace, warn};

use crate::detector::detect_in_area;
use crate::geometry::compute_rectangle;
use crate::renderer::{draw_mask, draw_outline};
use crate::scanner::{DataCallback, ScannerService};

/// 디코더 준비 완료 콜백 (한 번만 호출)
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

/// 루프 인스턴스 수명 동안 고정되는 옵션
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// 검출 외곽선 색
    pub highlight_color: Rgba,
    /// 스캔 영역 정책
    pub scan_area: ScanArea,
    /// 디코드 시도 사이 최소 간격 (0 = 매 틱)
    pub scan_delay: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            highlight_color: Rgba::opaque(0xFF, 0x3B, 0x58),
            scan_area: ScanArea::FullSurface,
            scan_delay: Duration::ZERO,
        }
    }
}

impl ScanOptions {
    /// 설정에서 옵션 생성 (검증 포함)
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            highlight_color: config.highlight()?,
            scan_area: config.scanner.scan_area,
            scan_delay: config.scan_delay(),
        })
    }
}

/// 루프 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// 실행된 틱 (건너뛴 틱 포함)
    pub ticks: u64,
    /// 표면에 복사된 프레임
    pub frames_captured: u64,
    /// 디코드 시도
    pub decode_attempts: u64,
    /// 보고된 검출
    pub detections: u64,
}

/// 루프 밖에서 종료를 요청하는 핸들 (데이터 콜백 안에서도 사용 가능)
#[derive(Debug, Clone)]
pub struct StopHandle {
    alive: Arc<AtomicBool>,
}

impl StopHandle {
    /// 종료 요청. 다음 틱 진입 시 루프가 자원을 해제한다.
    pub fn stop(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        !self.alive.load(Ordering::SeqCst)
    }
}

/// QR 스캔 루프
pub struct QrScanLoop {
    options: ScanOptions,
    provider: Arc<dyn DecoderProvider>,
    canvas: Box<dyn CanvasContext>,
    scheduler: Box<dyn FrameScheduler>,
    video: Option<Box<dyn VideoSource>>,
    scanner: ScannerService,
    alive: Arc<AtomicBool>,
    pending: Option<FrameRequestId>,
    /// 마지막 디코드 시도 시각
    last_scanned_at: Option<Instant>,
    stopped: bool,
    oversize_warned: bool,
    stats: ScanStats,
}

impl QrScanLoop {
    pub fn new(
        options: ScanOptions,
        provider: Arc<dyn DecoderProvider>,
        canvas: Box<dyn CanvasContext>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self {
        Self {
            options,
            provider,
            canvas,
            scheduler,
            video: None,
            scanner: ScannerService::new(),
            alive: Arc::new(AtomicBool::new(true)),
            pending: None,
            last_scanned_at: None,
            stopped: false,
            oversize_warned: false,
            stats: ScanStats::default(),
        }
    }

    /// 루프 시작.
    ///
    /// 스트림이 없으면 아무것도 하지 않는다. 디코더를 비동기로 초기화한 뒤
    /// `on_ready`를 한 번 호출하고 첫 틱을 예약한다. 초기화 오류는 그대로 반환한다.
    pub async fn start(
        &mut self,
        stream: Option<Box<dyn VideoSource>>,
        on_data: DataCallback,
        on_ready: Option<ReadyCallback>,
    ) -> Result<(), CoreError> {
        let Some(mut video) = stream else {
            debug!("비디오 스트림 없음 — 시작 생략");
            return Ok(());
        };
        if self.stopped || !self.alive.load(Ordering::SeqCst) {
            debug!("이미 종료된 루프 — 시작 생략");
            return Ok(());
        }
        if self.video.is_some() {
            warn!("이미 실행 중인 루프 — 새 스트림 무시");
            return Ok(());
        }

        if let Err(e) = video.play() {
            warn!("비디오 재생 실패 (계속 진행): {e}");
        }
        info!(
            "스캔 루프 시작: 영역={:?}, 간격={:?}",
            self.options.scan_area, self.options.scan_delay
        );
        self.video = Some(video);

        let provider = self.provider.clone();
        self.scanner.start(provider.as_ref(), on_data).await?;

        // 초기화 대기 중에 종료가 요청된 경우
        if !self.alive.load(Ordering::SeqCst) {
            debug!("초기화 중 종료 요청됨");
            self.stop();
            return Ok(());
        }

        if let Some(on_ready) = on_ready {
            on_ready();
        }
        self.pending = Some(self.scheduler.request_frame());
        Ok(())
    }

    /// 예약된 프레임 요청 처리 (`now` = 화면 갱신 시각)
    pub fn on_frame(&mut self, id: FrameRequestId, now: Instant) {
        if !self.alive.load(Ordering::SeqCst) {
            self.stop();
            return;
        }
        if self.pending != Some(id) {
            trace!("예약되지 않은 프레임 요청 무시: {:?}", id);
            return;
        }
        self.pending = None;

        self.tick(now);

        // 데이터 콜백에서 종료를 요청했을 수 있음
        if !self.alive.load(Ordering::SeqCst) {
            self.stop();
            return;
        }
        self.pending = Some(self.scheduler.request_frame());
    }

    fn tick(&mut self, now: Instant) {
        self.stats.ticks += 1;

        let Some(video) = self.video.as_deref() else {
            return;
        };
        if !self.scanner.is_ready() {
            trace!("디코더 미준비 — 틱 건너뜀");
            return;
        }
        if video.ready_state() != ReadyState::HaveEnoughData {
            trace!("버퍼 부족 ({:?}) — 틱 건너뜀", video.ready_state());
            return;
        }
        let Some(frame) = video.current_frame() else {
            return;
        };

        // 해상도는 프레임에서 읽는다 (회전 등으로 세션 중 바뀔 수 있음)
        let (width, height) = (frame.width, frame.height);
        self.canvas.set_size(width, height);
        self.canvas.draw_image(&frame, 0, 0, width, height);
        self.stats.frames_captured += 1;

        let area = compute_rectangle(width, height, &self.options.scan_area);
        if !area.fits_within(width, height) && !self.oversize_warned {
            warn!(
                "스캔 영역이 표면보다 큼: {:?} / {}x{} — 경계로 잘라서 읽음",
                area, width, height
            );
            self.oversize_warned = true;
        }
        if !self.options.scan_area.is_full_surface() {
            draw_mask(self.canvas.as_mut(), &area, width, height);
        }

        if self.should_scan(now) {
            self.last_scanned_at = Some(now);
            self.stats.decode_attempts += 1;
            if scan(
                self.canvas.as_mut(),
                &mut self.scanner,
                &area,
                self.options.highlight_color,
            ) {
                self.stats.detections += 1;
            }
        }
    }

    fn should_scan(&self, now: Instant) -> bool {
        if self.options.scan_delay.is_zero() {
            return true;
        }
        match self.last_scanned_at {
            Some(last) => now.saturating_duration_since(last) > self.options.scan_delay,
            None => true,
        }
    }

    /// 루프 종료 — 대기 중인 요청 취소, 디코더 해제, 비디오 분리. 반복 호출 안전.
    pub fn stop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if self.stopped {
            return;
        }
        self.stopped = true;

        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        self.scanner.cleanup();
        if let Some(mut video) = self.video.take() {
            video.detach();
        }
        info!(
            "스캔 루프 종료: 틱 {}, 디코드 {}, 검출 {}",
            self.stats.ticks, self.stats.decode_attempts, self.stats.detections
        );
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            alive: self.alive.clone(),
        }
    }

    /// 다음 틱이 예약되어 있는지
    pub fn is_running(&self) -> bool {
        !self.stopped && self.pending.is_some() && self.alive.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// 비디오 스트림이 끝났는지
    pub fn stream_ended(&self) -> bool {
        self.video.as_deref().is_some_and(|video| video.is_ended())
    }

    pub fn canvas(&self) -> &dyn CanvasContext {
        self.canvas.as_ref()
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }
}

impl Drop for QrScanLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 디코드-보고 단계.
///
/// 스캔 영역을 잘라 디코드하고, 검출되면 외곽선을 그린 뒤 페이로드를 한 번 보고한다.
/// 검출 여부를 반환한다.
pub fn scan(
    canvas: &mut dyn CanvasContext,
    scanner: &mut ScannerService,
    area: &Rect,
    color: Rgba,
) -> bool {
    let Some(decoder) = scanner.decoder() else {
        return false;
    };
    let Some(detection) = detect_in_area(&*canvas, decoder, area) else {
        return false;
    };

    draw_outline(canvas, &detection.area, &detection.code.location, color);
    scanner.found_qr_code(&detection.code.data);
    true
}
