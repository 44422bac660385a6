//! 비디오 소스 포트.
//!
//! 스트림 획득 자체는 범위 밖이다. 스캔 루프는 재생용 임시 비디오 요소를
//! 이 trait으로만 다루며, 종료 시 `detach`로 분리한다.
//! 구현: `qrwatch-vision::sequence::ImageSequenceSource`

use crate::error::CoreError;
use crate::models::frame::{FrameView, ReadyState};

/// 재생 중인 비디오 요소
pub trait VideoSource: Send {
    /// 재생 시작
    fn play(&mut self) -> Result<(), CoreError>;

    /// 현재 버퍼링 상태
    fn ready_state(&self) -> ReadyState;

    /// 현재 재생 위치의 프레임. 해상도는 프레임마다 바뀔 수 있다.
    fn current_frame(&self) -> Option<FrameView<'_>>;

    /// 스트림이 끝났는지 (라이브 스트림은 항상 false)
    fn is_ended(&self) -> bool {
        false
    }

    /// 재생 요소 분리 및 리소스 해제. 여러 번 호출해도 안전해야 한다.
    fn detach(&mut self);
}
