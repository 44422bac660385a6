//! # qrwatch
//!
//! 이미지 시퀀스를 비디오처럼 재생하며 QR 코드를 실시간 스캔하는 바이너리.
//! 설정 로드와 CLI 오버라이드, 디코더/캔버스/프레임 큐 와이어링, 라이프사이클 관리.

mod lifecycle;
mod runner;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use qrwatch_core::config::AppConfig;
use qrwatch_core::config_manager::ConfigManager;
use qrwatch_core::models::geometry::ScanArea;
use qrwatch_vision::rqrr_decoder::RqrrDecoderProvider;
use qrwatch_vision::scan_loop::ScanOptions;
use qrwatch_vision::sequence::ImageSequenceSource;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::lifecycle::ShutdownSignal;
use crate::runner::{RunnerConfig, ScanRunner};

/// 실시간 QR 스캐너
///
/// 이미지 디렉토리(이름순) 또는 단일 이미지를 프레임으로 재생하며 QR 페이로드를 출력한다.
#[derive(Parser, Debug)]
#[command(name = "qrwatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 프레임 소스 — 이미지 디렉토리 또는 단일 이미지 파일
    #[arg(long, short = 'f')]
    frames: PathBuf,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 중앙 정사각형 스캔 영역 크기 (픽셀, 미지정 시 전체 표면)
    #[arg(long)]
    scan_area_size: Option<u32>,

    /// 디코드 시도 사이 최소 간격 (밀리초, 0 = 매 프레임)
    #[arg(long)]
    scan_delay_ms: Option<u64>,

    /// 검출 외곽선 색 (#RRGGBB, rgb(...) 등)
    #[arg(long)]
    highlight_color: Option<String>,

    /// 화면 갱신 주기 (초당 프레임)
    #[arg(long)]
    frame_rate: Option<u32>,

    /// 마지막 프레임 뒤 처음부터 반복
    #[arg(long = "loop")]
    loop_frames: bool,

    /// 검출 프레임 오버레이(PNG) 저장 디렉토리
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// 첫 검출 후 종료
    #[arg(long)]
    exit_on_first: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

/// CLI 값으로 설정 덮어쓰기 (파일에는 저장하지 않음)
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(size) = args.scan_area_size {
        config.scanner.scan_area = ScanArea::CenteredSquare(size);
    }
    if let Some(delay) = args.scan_delay_ms {
        config.scanner.scan_delay_ms = delay;
    }
    if let Some(color) = &args.highlight_color {
        config.scanner.highlight_color = color.clone();
    }
    if let Some(rate) = args.frame_rate {
        config.host.frame_rate = rate;
    }
    if args.loop_frames {
        config.host.loop_frames = true;
    }
    if let Some(dir) = &args.output_dir {
        config.host.output_dir = Some(dir.clone());
    }
}

/// 설정 로드 — 지정 경로, 플랫폼 기본 경로, 기본값 순
fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let manager = match path {
        Some(path) => ConfigManager::open(path)
            .with_context(|| format!("설정 파일 로드 실패: {}", path.display()))?,
        None => match ConfigManager::open_default() {
            Ok(manager) => manager,
            Err(e) => {
                warn!("설정 관리자 초기화 실패, 기본 설정 사용: {e}");
                return Ok(AppConfig::default_config());
            }
        },
    };
    info!("설정 파일: {:?}", manager.path());
    Ok(manager.get())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "qrwatch={},qrwatch_core={},qrwatch_vision={}",
        args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(args.config.as_ref())?;
    apply_overrides(&mut config, &args);
    let options = ScanOptions::from_config(&config).context("잘못된 설정")?;

    let source = ImageSequenceSource::open(&args.frames, config.frame_period(), config.host.loop_frames)
        .with_context(|| format!("프레임 소스 열기 실패: {}", args.frames.display()))?;
    info!(
        "프레임 {}장, {}fps, 영역={:?}",
        source.len(),
        config.host.frame_rate,
        options.scan_area
    );

    let shutdown = Arc::new(ShutdownSignal::new());
    let listener = shutdown.clone();
    tokio::spawn(async move {
        listener.listen().await;
    });

    let runner = ScanRunner::new(
        options,
        Arc::new(RqrrDecoderProvider::new()),
        RunnerConfig {
            frame_period: config.frame_period(),
            output_dir: config.host.output_dir.clone(),
            exit_on_first: args.exit_on_first,
            print_payloads: true,
        },
    );
    let summary = runner.run(Box::new(source), shutdown.subscribe()).await?;

    if let Some(reason) = shutdown.reason() {
        info!("시그널로 종료: {reason}");
    }
    if summary.payloads.is_empty() {
        info!("검출된 QR 코드 없음");
    }
    Ok(())
}
