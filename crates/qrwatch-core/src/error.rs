//! QRWATCH 핵심 에러 타입.
//!
//! 라이브러리 crate는 `Result<T, CoreError>`를 반환하고,
//! 바이너리는 `anyhow`로 감싸 컨텍스트를 덧붙인다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 — {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 디코더 초기화 실패 (스캔 루프 시작 시 그대로 전파됨)
    #[error("디코더 초기화 실패: {0}")]
    DecoderInit(String),

    /// 비디오 소스 에러 (프레임 로드, 재생 실패)
    #[error("비디오 소스 에러: {0}")]
    Video(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 유효성 검증 에러 생성 헬퍼
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
