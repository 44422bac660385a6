//! 스캔 영역 기하 모델.
//!
//! 표면 좌표계의 직사각형, 점, 관심 영역(ROI) 정책을 정의한다.

use serde::{Deserialize, Serialize};

/// 2D 점 (부동소수점, 디코더 코너 좌표)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 스캔 직사각형.
///
/// 영역 크기가 표면보다 크면 원점이 음수가 될 수 있으므로 `x`, `y`는 부호 있는 정수다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// 오른쪽 경계 (배타)
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.w)
    }

    /// 아래쪽 경계 (배타)
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.h)
    }

    /// 면적이 0인지
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// `0 ≤ x`, `0 ≤ y`, `x+w ≤ width`, `y+h ≤ height` 만족 여부
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= i64::from(width)
            && self.bottom() <= i64::from(height)
    }

    /// 표면 경계 `[0, width) × [0, height)`와의 교집합.
    ///
    /// 겹치는 영역이 없으면 `None`.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Rect> {
        let left = i64::from(self.x).max(0);
        let top = i64::from(self.y).max(0);
        let right = self.right().min(i64::from(width));
        let bottom = self.bottom().min(i64::from(height));

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect {
            x: left as i32,
            y: top as i32,
            w: (right - left) as u32,
            h: (bottom - top) as u32,
        })
    }
}

/// 관심 영역 정책.
///
/// 스캔 루프 인스턴스 수명 동안 불변.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanArea {
    /// 표면 전체 스캔
    #[default]
    FullSurface,
    /// 표면 중앙의 한 변 S 정사각형
    CenteredSquare(u32),
}

impl ScanArea {
    /// 설정의 선택적 크기 값에서 정책 생성 (`None`이면 전체 표면)
    pub fn from_size(size: Option<u32>) -> Self {
        match size {
            Some(size) => Self::CenteredSquare(size),
            None => Self::FullSurface,
        }
    }

    pub fn is_full_surface(&self) -> bool {
        matches!(self, Self::FullSurface)
    }
}
