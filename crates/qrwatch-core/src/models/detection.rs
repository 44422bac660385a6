//! QR 검출 결과 모델.
//!
//! 디코더 포트의 입출력 타입. 코너 좌표는 스캔 직사각형 로컬 좌표계.

use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// 색상 반전 디코딩 시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InversionAttempts {
    /// 원본만 시도
    DontInvert,
    /// 반전 이미지만 시도
    OnlyInvert,
    /// 원본 → 반전 순서로 시도
    #[default]
    AttemptBoth,
    /// 반전 → 원본 순서로 시도
    InvertFirst,
}

impl InversionAttempts {
    /// 시도 순서 (`true` = 반전)
    pub fn passes(self) -> &'static [bool] {
        match self {
            Self::DontInvert => &[false],
            Self::OnlyInvert => &[true],
            Self::AttemptBoth => &[false, true],
            Self::InvertFirst => &[true, false],
        }
    }
}

/// 디코드 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodeOptions {
    pub inversion_attempts: InversionAttempts,
}

impl DecodeOptions {
    /// 반전 시도 없는 옵션
    pub const fn dont_invert() -> Self {
        Self {
            inversion_attempts: InversionAttempts::DontInvert,
        }
    }
}

/// 검출된 코드의 네 코너 (TL, TR, BR, BL)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrLocation {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl QrLocation {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// 순환 순서의 코너 배열
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// TL→TR→BR→BL→TL 네 변
    pub fn edges(&self) -> [(Point, Point); 4] {
        [
            (self.top_left, self.top_right),
            (self.top_right, self.bottom_right),
            (self.bottom_right, self.bottom_left),
            (self.bottom_left, self.top_left),
        ]
    }
}

/// 한 번의 디코드 호출 결과.
///
/// 해당 틱이 끝나면 보관하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    /// 디코딩된 텍스트 페이로드
    pub data: String,
    /// 원시 바이트 페이로드
    pub binary_data: Vec<u8>,
    /// QR 버전 (1 ~ 40)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<usize>,
    /// 스캔 직사각형 로컬 좌표의 코너
    pub location: QrLocation,
}
