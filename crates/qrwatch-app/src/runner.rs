//! 프레임 펌프.
//!
//! 화면 갱신 주기(`tokio::time::interval`)마다 그 시점에 대기 중이던 프레임 요청을 꺼내
//! 갱신 시각과 함께 스캔 루프에 전달한다. 요청은 한 번에 하나씩 처리되므로 틱이 겹치지 않는다.
//! 보고된 페이로드는 stdout으로 내보내고, 설정된 경우 해당 틱의 오버레이를 PNG로 저장한다.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use image::RgbaImage;
use qrwatch_core::ports::decoder::DecoderProvider;
use qrwatch_core::ports::video::VideoSource;
use qrwatch_vision::canvas::RgbaCanvas;
use qrwatch_vision::frame_queue::FrameQueue;
use qrwatch_vision::scan_loop::{QrScanLoop, ScanOptions, ScanStats};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::lifecycle::ShutdownReason;

/// 펌프 설정
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// 화면 갱신 주기
    pub frame_period: Duration,
    /// 검출 틱 오버레이 저장 경로
    pub output_dir: Option<PathBuf>,
    /// 첫 검출 후 종료
    pub exit_on_first: bool,
    /// 페이로드를 stdout으로 출력
    pub print_payloads: bool,
}

/// 실행 결과
#[derive(Debug, Default)]
pub struct RunSummary {
    pub payloads: Vec<String>,
    pub saved_overlays: Vec<PathBuf>,
    pub stats: ScanStats,
}

/// 스캔 루프 + 프레임 큐 + 갱신 펌프
pub struct ScanRunner {
    scan_loop: QrScanLoop,
    queue: FrameQueue,
    config: RunnerConfig,
}

impl ScanRunner {
    pub fn new(options: ScanOptions, provider: Arc<dyn DecoderProvider>, config: RunnerConfig) -> Self {
        let queue = FrameQueue::new();
        let scan_loop = QrScanLoop::new(
            options,
            provider,
            Box::new(RgbaCanvas::new(0, 0)),
            Box::new(queue.clone()),
        );
        Self {
            scan_loop,
            queue,
            config,
        }
    }

    /// 스트림이 끝나거나, 종료 신호를 받거나, (`exit_on_first`) 첫 검출까지 실행
    pub async fn run(
        mut self,
        source: Box<dyn VideoSource>,
        mut shutdown_rx: watch::Receiver<Option<ShutdownReason>>,
    ) -> Result<RunSummary> {
        if let Some(dir) = &self.config.output_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("출력 디렉토리 생성 실패: {}", dir.display()))?;
        }

        let (payload_tx, mut payload_rx) = mpsc::unbounded_channel::<String>();
        let stop = self.scan_loop.stop_handle();
        let exit_on_first = self.config.exit_on_first;

        self.scan_loop
            .start(
                Some(source),
                Box::new(move |data| {
                    let _ = payload_tx.send(data.to_string());
                    if exit_on_first {
                        stop.stop();
                    }
                }),
                Some(Box::new(|| info!("디코더 준비 — 스캔 시작"))),
            )
            .await
            .context("스캔 루프 시작 실패")?;

        let mut summary = RunSummary::default();
        let mut interval = tokio::time::interval(self.config.frame_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if let Some(reason) = *shutdown_rx.borrow() {
                info!("종료 요청({reason}) — 펌프 중단");
                break;
            }

            tokio::select! {
                refresh = interval.tick() => {
                    let now = refresh.into_std();
                    for id in self.queue.take_due() {
                        self.scan_loop.on_frame(id, now);
                    }

                    let mut detected = false;
                    while let Ok(payload) = payload_rx.try_recv() {
                        if self.config.print_payloads {
                            println!("{payload}");
                        }
                        summary.payloads.push(payload);
                        detected = true;
                    }
                    if detected {
                        if let Some(dir) = self.config.output_dir.clone() {
                            match self.save_overlay(&dir, summary.saved_overlays.len()) {
                                Ok(path) => summary.saved_overlays.push(path),
                                Err(e) => warn!("오버레이 저장 실패: {e:#}"),
                            }
                        }
                    }

                    if self.scan_loop.is_stopped() {
                        debug!("스캔 루프가 스스로 종료됨");
                        break;
                    }
                    if self.scan_loop.stream_ended() {
                        info!("스트림 종료");
                        break;
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        debug!("종료 채널 닫힘");
                        break;
                    }
                }
            }
        }

        self.scan_loop.stop();
        summary.stats = self.scan_loop.stats();
        info!(
            "실행 종료: 틱 {}, 캡처 {}, 디코드 {}, 검출 {}",
            summary.stats.ticks,
            summary.stats.frames_captured,
            summary.stats.decode_attempts,
            summary.stats.detections
        );
        Ok(summary)
    }

    /// 현재 표면(마지막 틱의 오버레이)을 PNG로 저장
    fn save_overlay(&self, dir: &Path, index: usize) -> Result<PathBuf> {
        let canvas = self.scan_loop.canvas();
        let (width, height) = (canvas.width(), canvas.height());
        let data = canvas.get_image_data(0, 0, width, height);
        let image = RgbaImage::from_raw(width, height, data.data)
            .context("표면 버퍼 크기가 맞지 않음")?;

        let path = dir.join(format!("detection_{index:04}.png"));
        image
            .save(&path)
            .with_context(|| format!("PNG 저장 실패: {}", path.display()))?;
        debug!("오버레이 저장: {}", path.display());
        Ok(path)
    }
}
