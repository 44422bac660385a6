//! 스캐너 서비스.
//!
//! 디코더 초기화와 페이로드 전달을 담당하는 호스트 측 협력자.
//! 스캔 루프는 디코더를 소유하지 않고 이 서비스를 통해서만 접근한다.

use qrwatch_core::error::CoreError;
use qrwatch_core::ports::decoder::{DecoderProvider, QrDecoder};
use tracing::{debug, info};

/// 페이로드 콜백
pub type DataCallback = Box<dyn FnMut(&str) + Send>;

/// 디코더 + 페이로드 콜백 보관
#[derive(Default)]
pub struct ScannerService {
    decoder: Option<Box<dyn QrDecoder>>,
    on_data: Option<DataCallback>,
}

impl ScannerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 디코더를 비동기로 로드하고 콜백을 등록한다. 실패하면 상태는 그대로.
    pub async fn start(
        &mut self,
        provider: &dyn DecoderProvider,
        on_data: DataCallback,
    ) -> Result<(), CoreError> {
        debug!("디코더 로드 시작: {}", provider.provider_name());
        let decoder = provider.load().await?;

        self.decoder = Some(decoder);
        self.on_data = Some(on_data);
        info!("디코더 준비 완료: {}", provider.provider_name());
        Ok(())
    }

    /// 로드된 디코더
    pub fn decoder(&self) -> Option<&dyn QrDecoder> {
        self.decoder.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.decoder.is_some()
    }

    /// 검출 페이로드 전달
    pub fn found_qr_code(&mut self, data: &str) {
        match self.on_data.as_mut() {
            Some(callback) => callback(data),
            None => debug!("콜백 없음, 페이로드 버림 ({} 바이트)", data.len()),
        }
    }

    /// 디코더와 콜백 해제
    pub fn cleanup(&mut self) {
        if self.decoder.take().is_some() {
            debug!("디코더 해제");
        }
        self.on_data = None;
    }
}
