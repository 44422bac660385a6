//! 애플리케이션 설정 구조체.
//!
//! 스캐너(하이라이트 색상, 스캔 영역, 스캔 간격)와 데모 호스트(프레임 속도,
//! 반복 재생, 오버레이 저장 경로) 설정을 정의한다. JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::color::Rgba;
use crate::models::geometry::ScanArea;

/// 기본 하이라이트 색상
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#FF3B58";

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 스캔 루프 설정
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// 호스트(데모 바이너리) 설정
    #[serde(default)]
    pub host: HostConfig,
}

// ============================================================
// 스캐너 설정
// ============================================================

/// 스캐너 설정 — 루프 인스턴스 생성 시 한 번 읽힌다
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// 검출된 코드 외곽선 색상
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,
    /// 관심 영역 정책
    #[serde(default)]
    pub scan_area: ScanArea,
    /// 최소 스캔 간격 (밀리초, 0이면 매 틱)
    #[serde(default)]
    pub scan_delay_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            highlight_color: default_highlight_color(),
            scan_area: ScanArea::FullSurface,
            scan_delay_ms: 0,
        }
    }
}

fn default_highlight_color() -> String {
    DEFAULT_HIGHLIGHT_COLOR.to_string()
}

// ============================================================
// 호스트 설정
// ============================================================

/// 호스트 설정 — 프레임 펌프와 출력
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// 디스플레이 갱신 속도 (Hz)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// 이미지 시퀀스 반복 재생
    #[serde(default)]
    pub loop_frames: bool,
    /// 검출 시 오버레이 PNG 저장 디렉토리
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            loop_frames: false,
            output_dir: None,
        }
    }
}

fn default_frame_rate() -> u32 {
    60
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            host: HostConfig::default(),
        }
    }

    /// 최소 스캔 간격을 Duration으로 반환
    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scanner.scan_delay_ms)
    }

    /// 디스플레이 갱신 주기를 Duration으로 반환
    pub fn frame_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.host.frame_rate.max(1)))
    }

    /// 하이라이트 색상 파싱
    pub fn highlight(&self) -> Result<Rgba, CoreError> {
        Rgba::parse(&self.scanner.highlight_color).map_err(|_| {
            CoreError::validation(
                "scanner.highlight_color",
                format!("잘못된 색상: {}", self.scanner.highlight_color),
            )
        })
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        self.highlight()?;

        if let ScanArea::CenteredSquare(0) = self.scanner.scan_area {
            return Err(CoreError::validation(
                "scanner.scan_area",
                "정사각형 크기는 0보다 커야 함",
            ));
        }

        if self.host.frame_rate == 0 {
            return Err(CoreError::validation(
                "host.frame_rate",
                "프레임 속도는 0보다 커야 함",
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
