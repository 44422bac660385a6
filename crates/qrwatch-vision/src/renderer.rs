//! 오버레이 렌더러.
//!
//! 스캔 영역 바깥을 어둡게 덮는 마스크와, 검출된 코드의 네 변 외곽선.
//! 두 연산 모두 `save`/`restore`로 감싸 컨텍스트 상태(변환, 클립, 스타일)를 남기지 않는다.

use qrwatch_core::models::color::Rgba;
use qrwatch_core::models::detection::QrLocation;
use qrwatch_core::models::geometry::{Point, Rect};
use qrwatch_core::ports::canvas::CanvasContext;

/// 마스크 채움색 — `rgb(0, 0, 0, .4)`
pub const MASK_FILL: Rgba = Rgba::new(0, 0, 0, 102);

/// 외곽선 두께
pub const OUTLINE_WIDTH: f32 = 4.0;

/// 스캔 영역 바깥(좌/상/우/하 띠)을 반투명 검정으로 덮는다.
///
/// 네 띠를 하나의 클립 경로로 합쳐 한 번만 채우므로 모서리가 두 번 칠해지지 않는다.
pub fn draw_mask(ctx: &mut dyn CanvasContext, area: &Rect, width: u32, height: u32) {
    let (x, y) = (area.x as f32, area.y as f32);
    let (right, bottom) = (area.right() as f32, area.bottom() as f32);
    let (w, h) = (width as f32, height as f32);

    ctx.save();
    ctx.begin_path();
    ctx.rect(0.0, 0.0, x, h);
    ctx.rect(0.0, 0.0, w, y);
    ctx.rect(right, 0.0, w, h);
    ctx.rect(0.0, bottom, w, h);
    ctx.clip();

    ctx.set_fill_style(MASK_FILL);
    ctx.fill_rect(0.0, 0.0, w, h);
    ctx.restore();
}

/// 검출된 코드 외곽선.
///
/// 코너는 스캔 직사각형 로컬 좌표이므로 원점을 `(area.x, area.y)`로 옮겨 그린다.
pub fn draw_outline(ctx: &mut dyn CanvasContext, area: &Rect, location: &QrLocation, color: Rgba) {
    ctx.save();
    ctx.translate(area.x as f32, area.y as f32);
    for (begin, end) in location.edges() {
        draw_line(ctx, begin, end, color);
    }
    ctx.restore();
}

fn draw_line(ctx: &mut dyn CanvasContext, begin: Point, end: Point, color: Rgba) {
    ctx.begin_path();
    ctx.move_to(begin.x, begin.y);
    ctx.line_to(end.x, end.y);
    ctx.set_line_width(OUTLINE_WIDTH);
    ctx.set_stroke_style(color);
    ctx.stroke();
}
