//! 프레임 요청 큐.
//!
//! 스캔 루프가 "다음 화면 갱신에 한 번 호출해 달라"고 요청하면 여기에 쌓이고,
//! 호스트의 갱신 펌프가 갱신 시점마다 `take_due`로 꺼내 `on_frame`을 호출한다.
//! 취소된 요청은 꺼내지지 않는다.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use qrwatch_core::ports::scheduler::{FrameRequestId, FrameScheduler};
use tracing::trace;

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    pending: VecDeque<FrameRequestId>,
}

/// 공유 프레임 요청 큐 (복제본끼리 같은 큐를 본다)
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 대기 중인 요청 전부 꺼내기 (이번 갱신에서 처리할 것)
    pub fn take_due(&self) -> Vec<FrameRequestId> {
        self.inner.lock().pending.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameRequestId {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = FrameRequestId(inner.next_id);
        inner.pending.push_back(id);
        trace!("프레임 요청 {:?}", id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        let mut inner = self.inner.lock();
        inner.pending.retain(|pending| *pending != id);
        trace!("프레임 요청 취소 {:?}", id);
    }
}
