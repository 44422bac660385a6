//! QR 디코더 포트.
//!
//! 구현: `qrwatch-vision::rqrr_decoder` (rqrr)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::detection::{DecodeOptions, QrCode};

/// 디코드 함수 — RGBA 버퍼 + 크기 + 옵션 → 선택적 결과.
///
/// 코드를 찾지 못한 경우는 에러가 아니라 `None`이다.
pub trait QrDecoder: Send {
    /// `data`는 `width * height * 4` 바이트의 RGBA8 버퍼.
    /// 반환 코너 좌표는 버퍼 로컬 좌표.
    fn decode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        options: &DecodeOptions,
    ) -> Option<QrCode>;
}

/// 디코더 제공자 — 디코드 호출 전에 완료되어야 하는 비동기 초기화 단계
#[async_trait]
pub trait DecoderProvider: Send + Sync {
    /// 디코더 로드. 실패는 스캔 루프 시작을 기다리는 쪽으로 그대로 전파된다.
    async fn load(&self) -> Result<Box<dyn QrDecoder>, CoreError>;

    /// 제공자 이름 (예: "rqrr")
    fn provider_name(&self) -> &str;
}
