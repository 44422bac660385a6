//! 스캔 파이프라인 통합 테스트.
//!
//! 이미지 시퀀스 → 스캔 루프 → RgbaCanvas → rqrr 디코더 → 페이로드 보고.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use image::{Luma, Rgba, RgbaImage};
use parking_lot::Mutex;
use qrwatch_core::error::CoreError;
use qrwatch_core::models::geometry::ScanArea;
use qrwatch_core::ports::decoder::{DecoderProvider, QrDecoder};
use qrwatch_vision::canvas::RgbaCanvas;
use qrwatch_vision::frame_queue::FrameQueue;
use qrwatch_vision::rqrr_decoder::RqrrDecoderProvider;
use qrwatch_vision::scan_loop::{QrScanLoop, ScanOptions};
use qrwatch_vision::sequence::ImageSequenceSource;

/// 흰 프레임의 (ox, oy)에 QR 코드를 그린다
fn frame_with_code(payload: &str, width: u32, height: u32, origin: Option<(u32, u32)>) -> RgbaImage {
    let code = qrcode::QrCode::new(payload.as_bytes()).unwrap();
    let rendered = code.render::<Luma<u8>>().module_dimensions(6, 6).build();

    let (ox, oy) = origin.unwrap_or((
        (width - rendered.width()) / 2,
        (height - rendered.height()) / 2,
    ));
    let mut frame = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    for (x, y, px) in rendered.enumerate_pixels() {
        frame.put_pixel(ox + x, oy + y, Rgba([px[0], px[0], px[0], 255]));
    }
    frame
}

struct Pipeline {
    scan_loop: QrScanLoop,
    queue: FrameQueue,
    reports: Arc<Mutex<Vec<String>>>,
}

impl Pipeline {
    async fn start(options: ScanOptions, frame: RgbaImage) -> Self {
        let queue = FrameQueue::new();
        let mut scan_loop = QrScanLoop::new(
            options,
            Arc::new(RqrrDecoderProvider::new()),
            Box::new(RgbaCanvas::new(0, 0)),
            Box::new(queue.clone()),
        );
        let source =
            ImageSequenceSource::from_frames(vec![frame], Duration::from_secs(3600), true).unwrap();

        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        scan_loop
            .start(
                Some(Box::new(source)),
                Box::new(move |data| sink.lock().push(data.to_string())),
                None,
            )
            .await
            .unwrap();

        Self {
            scan_loop,
            queue,
            reports,
        }
    }

    fn refresh(&mut self, now: Instant) {
        for id in self.queue.take_due() {
            self.scan_loop.on_frame(id, now);
        }
    }

    fn surface(&self) -> RgbaImage {
        let canvas = self.scan_loop.canvas();
        let data = canvas.get_image_data(0, 0, canvas.width(), canvas.height());
        RgbaImage::from_raw(data.width, data.height, data.data).unwrap()
    }
}

#[tokio::test]
async fn centered_square_detects_code_and_draws_overlay() {
    let options = ScanOptions {
        scan_area: ScanArea::CenteredSquare(220),
        ..ScanOptions::default()
    };
    let mut pipeline = Pipeline::start(options, frame_with_code("hello-pipeline", 320, 240, None)).await;

    pipeline.refresh(Instant::now());

    assert_eq!(*pipeline.reports.lock(), vec!["hello-pipeline".to_string()]);

    let surface = pipeline.surface();
    assert_eq!(surface.dimensions(), (320, 240));
    // 스캔 영역(50,10)-(270,230) 바깥은 0.4 검정으로 어두워짐
    assert_eq!(surface.get_pixel(5, 5).0, [153, 153, 153, 255]);
    assert_eq!(surface.get_pixel(315, 235).0, [153, 153, 153, 255]);
    // 영역 안쪽 여백은 그대로
    assert_eq!(surface.get_pixel(55, 15).0, [255, 255, 255, 255]);
    // 외곽선
    let highlight = [0xFF, 0x3B, 0x58, 0xFF];
    assert!(surface.pixels().any(|p| p.0 == highlight));
}

#[tokio::test]
async fn code_outside_scan_area_is_not_reported() {
    let options = ScanOptions {
        scan_area: ScanArea::CenteredSquare(100),
        ..ScanOptions::default()
    };
    let frame = frame_with_code("left-corner", 640, 240, Some((0, 0)));
    let mut pipeline = Pipeline::start(options, frame).await;

    let t0 = Instant::now();
    for i in 0..3 {
        pipeline.refresh(t0 + Duration::from_millis(16 * i));
    }

    assert!(pipeline.reports.lock().is_empty());
    let stats = pipeline.scan_loop.stats();
    assert_eq!(stats.decode_attempts, 3);
    assert_eq!(stats.detections, 0);
}

#[tokio::test]
async fn throttled_loop_reports_once_per_interval() {
    let options = ScanOptions {
        scan_delay: Duration::from_millis(1000),
        ..ScanOptions::default()
    };
    let mut pipeline = Pipeline::start(options, frame_with_code("slow", 320, 240, None)).await;

    let t0 = Instant::now();
    for i in 0..30 {
        pipeline.refresh(t0 + Duration::from_millis(16 * i));
    }

    assert_eq!(*pipeline.reports.lock(), vec!["slow".to_string()]);
    let stats = pipeline.scan_loop.stats();
    assert_eq!(stats.ticks, 30);
    assert_eq!(stats.frames_captured, 30);
    assert_eq!(stats.decode_attempts, 1);
}

#[tokio::test]
async fn every_tick_reports_when_unthrottled() {
    let mut pipeline =
        Pipeline::start(ScanOptions::default(), frame_with_code("again", 320, 240, None)).await;

    let t0 = Instant::now();
    for i in 0..3 {
        pipeline.refresh(t0 + Duration::from_millis(16 * i));
    }

    assert_eq!(pipeline.reports.lock().len(), 3);
}

#[tokio::test]
async fn stop_ends_scheduling() {
    let mut pipeline =
        Pipeline::start(ScanOptions::default(), frame_with_code("bye", 320, 240, None)).await;
    pipeline.scan_loop.stop();

    pipeline.refresh(Instant::now());

    assert!(pipeline.reports.lock().is_empty());
    assert_eq!(pipeline.queue.pending_count(), 0);
    assert_eq!(pipeline.scan_loop.stats().ticks, 0);
}

struct UnavailableProvider;

#[async_trait]
impl DecoderProvider for UnavailableProvider {
    async fn load(&self) -> Result<Box<dyn QrDecoder>, CoreError> {
        Err(CoreError::DecoderInit("디코더 모듈을 찾을 수 없음".to_string()))
    }

    fn provider_name(&self) -> &str {
        "unavailable"
    }
}

#[tokio::test]
async fn decoder_init_failure_reaches_caller() {
    let queue = FrameQueue::new();
    let mut scan_loop = QrScanLoop::new(
        ScanOptions::default(),
        Arc::new(UnavailableProvider),
        Box::new(RgbaCanvas::new(0, 0)),
        Box::new(queue.clone()),
    );
    let source = ImageSequenceSource::from_frames(
        vec![RgbaImage::new(8, 8)],
        Duration::from_millis(10),
        true,
    )
    .unwrap();

    let err = scan_loop
        .start(Some(Box::new(source)), Box::new(|_| {}), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::DecoderInit(_)));
    assert_eq!(queue.pending_count(), 0);
}
