//! 스캔 기하.
//!
//! 관심 영역 정책 + 현재 표면 크기 → 스캔 직사각형. 순수 함수이며 캐싱하지 않는다
//! (비디오 해상도는 세션 중에도 바뀔 수 있다).

use qrwatch_core::models::geometry::{Rect, ScanArea};

/// 스캔 직사각형 계산.
///
/// 중앙 정사각형의 원점은 `f64::round` (0.5는 0에서 먼 쪽)로 반올림한다.
/// 크기가 표면보다 크면 원점이 음수가 되거나 경계를 넘는다 — 픽셀을 읽기 전에
/// [`Rect::clamp_to`]로 자른다.
pub fn compute_rectangle(width: u32, height: u32, area: &ScanArea) -> Rect {
    match *area {
        ScanArea::FullSurface => Rect::new(0, 0, width, height),
        ScanArea::CenteredSquare(size) => Rect::new(
            centered_origin(width, size),
            centered_origin(height, size),
            size,
            size,
        ),
    }
}

fn centered_origin(extent: u32, size: u32) -> i32 {
    ((f64::from(extent) - f64::from(size)) / 2.0).round() as i32
}
