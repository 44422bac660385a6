//! 디코더 어댑터.
//!
//! 외부 디코드 함수를 감싼다. 프레임 표면에서 스캔 직사각형 영역만 잘라 읽고,
//! 반전 디코딩 없이 한 번 디코드한다. 코드를 찾지 못하는 것은 대부분의 틱에서
//! 일어나는 정상 상황이다.

use qrwatch_core::models::detection::{DecodeOptions, QrCode};
use qrwatch_core::models::frame::ImageData;
use qrwatch_core::models::geometry::Rect;
use qrwatch_core::ports::canvas::CanvasContext;
use qrwatch_core::ports::decoder::QrDecoder;
use tracing::{debug, trace, warn};

/// 어댑터가 디코더에 넘기는 고정 옵션 (반전 시도 없음)
pub const ADAPTER_OPTIONS: DecodeOptions = DecodeOptions::dont_invert();

/// 한 틱의 검출 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// 실제로 픽셀을 읽은 영역 (표면 경계로 잘린 스캔 직사각형)
    pub area: Rect,
    /// 디코딩 결과 (코너는 `area` 로컬 좌표)
    pub code: QrCode,
}

/// 잘라낸 RGBA 버퍼 디코드
pub fn detect(decoder: &dyn QrDecoder, image: &ImageData) -> Option<QrCode> {
    if image.width == 0 || image.height == 0 {
        return None;
    }

    match decoder.decode(&image.data, image.width, image.height, &ADAPTER_OPTIONS) {
        Some(code) => {
            debug!(
                "QR 검출: {} 바이트 ({}x{} 영역)",
                code.data.len(),
                image.width,
                image.height
            );
            Some(code)
        }
        None => {
            trace!("QR 없음 ({}x{})", image.width, image.height);
            None
        }
    }
}

/// 스캔 직사각형 영역만 표면에서 읽어 디코드.
///
/// 영역이 표면을 벗어나면 경계로 잘라서 읽고, 겹치는 부분이 없으면 디코드하지 않는다.
pub fn detect_in_area(
    ctx: &dyn CanvasContext,
    decoder: &dyn QrDecoder,
    area: &Rect,
) -> Option<Detection> {
    let (width, height) = (ctx.width(), ctx.height());
    let Some(read_area) = area.clamp_to(width, height) else {
        warn!("스캔 영역이 표면과 겹치지 않음: {:?} / {}x{}", area, width, height);
        return None;
    };

    if read_area != *area {
        debug!("스캔 영역을 표면 경계로 자름: {:?} → {:?}", area, read_area);
    }

    let image = ctx.get_image_data(read_area.x, read_area.y, read_area.w, read_area.h);
    detect(decoder, &image).map(|code| Detection {
        area: read_area,
        code,
    })
}
