//! rqrr 기반 QR 디코더.
//!
//! `QrDecoder` / `DecoderProvider` 포트 구현.
//! RGBA → 휘도(BT.601) 변환 후 rqrr 그리드 검출, 첫 번째로 디코딩되는 그리드를 반환한다.

use async_trait::async_trait;
use qrwatch_core::error::CoreError;
use qrwatch_core::models::detection::{DecodeOptions, QrCode, QrLocation};
use qrwatch_core::models::frame::byte_len;
use qrwatch_core::models::geometry::Point;
use qrwatch_core::ports::decoder::{DecoderProvider, QrDecoder};
use tracing::{debug, info, trace};

/// rqrr 디코더 — `QrDecoder` 포트 구현
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        options: &DecodeOptions,
    ) -> Option<QrCode> {
        if width == 0 || height == 0 {
            return None;
        }
        if data.len() < byte_len(width, height) {
            debug!(
                "버퍼 크기 부족: {} < {} ({}x{})",
                data.len(),
                byte_len(width, height),
                width,
                height
            );
            return None;
        }

        let luma = to_luma(data, width as usize, height as usize);
        options
            .inversion_attempts
            .passes()
            .iter()
            .find_map(|&invert| decode_luma(&luma, width as usize, height as usize, invert))
    }
}

/// RGBA8 → 8비트 휘도 (0.299R + 0.587G + 0.114B, 고정소수점)
fn to_luma(data: &[u8], width: usize, height: usize) -> Vec<u8> {
    data.chunks_exact(4)
        .take(width * height)
        .map(|px| {
            let (r, g, b) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
            ((77 * r + 150 * g + 29 * b) >> 8) as u8
        })
        .collect()
}

fn decode_luma(luma: &[u8], width: usize, height: usize, invert: bool) -> Option<QrCode> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
        let value = luma[y * width + x];
        if invert {
            255 - value
        } else {
            value
        }
    });

    let grids = prepared.detect_grids();
    trace!("rqrr 그리드 {}개 (반전={})", grids.len(), invert);

    grids.iter().find_map(|grid| match grid.decode() {
        Ok((meta, content)) => {
            let [tl, tr, br, bl] = grid.bounds;
            Some(QrCode {
                binary_data: content.as_bytes().to_vec(),
                data: content,
                version: Some(meta.version.0),
                location: QrLocation::new(
                    to_point(tl),
                    to_point(tr),
                    to_point(br),
                    to_point(bl),
                ),
            })
        }
        Err(e) => {
            debug!("그리드 디코딩 실패 (무시): {e:?}");
            None
        }
    })
}

fn to_point(p: rqrr::Point) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

/// rqrr 디코더 제공자 — 비동기 초기화 단계
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoderProvider;

impl RqrrDecoderProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DecoderProvider for RqrrDecoderProvider {
    async fn load(&self) -> Result<Box<dyn QrDecoder>, CoreError> {
        info!("rqrr 디코더 로드");
        Ok(Box::new(RqrrDecoder::new()))
    }

    fn provider_name(&self) -> &str {
        "rqrr"
    }
}
