//! 프레임 버퍼 모델.
//!
//! 비디오 소스가 내보내는 제로 카피 뷰와, 표면에서 읽어낸 소유 버퍼.
//! 모든 픽셀 데이터는 행 우선 RGBA8.

/// 비디오 버퍼링 상태 (HTMLMediaElement `readyState` 대응)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// 데이터 없음
    HaveNothing,
    /// 해상도 등 메타데이터만 있음
    HaveMetadata,
    /// 현재 위치의 프레임만 있음
    HaveCurrentData,
    /// 다음 프레임까지 있음
    HaveFutureData,
    /// 끊김 없이 재생 가능한 데이터 있음
    HaveEnoughData,
}

/// RGBA8 픽셀 버퍼 뷰 (복사 없음)
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
}

impl<'a> FrameView<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// 선언된 크기만큼 데이터가 있는지
    pub fn is_complete(&self) -> bool {
        self.data.len() >= byte_len(self.width, self.height)
    }
}

/// 표면 영역 읽기 결과 (RGBA8 소유 버퍼)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    /// 투명 검정으로 채운 버퍼
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; byte_len(width, height)],
            width,
            height,
        }
    }

    pub fn as_view(&self) -> FrameView<'_> {
        FrameView::new(&self.data, self.width, self.height)
    }
}

/// RGBA8 버퍼 바이트 길이
pub fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}
