//! 2D 즉시 모드 드로잉 컨텍스트 포트.
//!
//! 프레임 표면(픽셀 버퍼)과 그 컨텍스트를 하나로 추상화한다.
//! 구현: `qrwatch-vision::canvas::RgbaCanvas` (image::RgbaImage)

use crate::models::color::Rgba;
use crate::models::frame::{FrameView, ImageData};

/// 드로잉 컨텍스트.
///
/// `save`/`restore`는 변환, 스타일, 클립 상태를 스택으로 보존한다.
/// 경로 좌표와 `fill_rect`/`draw_image`는 현재 변환을 따르고,
/// `get_image_data`는 변환과 무관하게 표면 좌표를 사용한다.
pub trait CanvasContext: Send {
    /// 표면 너비 (픽셀)
    fn width(&self) -> u32;

    /// 표면 높이 (픽셀)
    fn height(&self) -> u32;

    /// 표면 크기 재설정. 픽셀은 투명으로 초기화되고 컨텍스트 상태도 리셋된다.
    fn set_size(&mut self, width: u32, height: u32);

    /// 프레임을 `(dx, dy, dw, dh)` 영역에 복사 (필요 시 스케일)
    fn draw_image(&mut self, frame: &FrameView<'_>, dx: i32, dy: i32, dw: u32, dh: u32);

    /// 표면 영역 읽기. 표면 밖 픽셀은 투명 검정.
    fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> ImageData;

    /// 현재 상태 저장
    fn save(&mut self);

    /// 마지막 저장 상태 복원 (스택이 비어 있으면 무시)
    fn restore(&mut self);

    /// 좌표 원점 이동
    fn translate(&mut self, dx: f32, dy: f32);

    /// 현재 경로 비우기
    fn begin_path(&mut self);

    /// 경로에 직사각형 추가
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    /// 새 하위 경로 시작점
    fn move_to(&mut self, x: f32, y: f32);

    /// 현재 점에서 선분 추가
    fn line_to(&mut self, x: f32, y: f32);

    /// 현재 경로로 클립 영역 축소
    fn clip(&mut self);

    fn set_fill_style(&mut self, color: Rgba);

    /// 직사각형 채우기 (클립 적용)
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn set_line_width(&mut self, width: f32);

    fn set_stroke_style(&mut self, color: Rgba);

    /// 현재 경로 외곽선 그리기 (클립 적용)
    fn stroke(&mut self);
}
