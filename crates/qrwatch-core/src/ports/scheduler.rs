//! 프레임 동기 스케줄러 포트.
//!
//! `requestAnimationFrame` 대응. 요청은 다음 디스플레이 갱신 직전에 한 번 실행되며,
//! 호스트가 요청을 직렬로 전달하므로 틱은 서로 겹치지 않는다.
//! 구현: `qrwatch-vision::frame_queue::FrameQueue`

/// 예약된 프레임 요청 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(pub u64);

/// 프레임 스케줄러
pub trait FrameScheduler: Send {
    /// 다음 갱신 시점에 틱 하나 예약
    fn request_frame(&mut self) -> FrameRequestId;

    /// 예약 취소 (최선 노력 — 이미 전달 중인 요청은 막지 못할 수 있음)
    fn cancel_frame(&mut self, id: FrameRequestId);
}
