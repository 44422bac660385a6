//! 이미지 시퀀스 비디오 소스.
//!
//! 디렉토리의 이미지 파일(이름순) 또는 단일 이미지를 일정 간격으로 재생하는
//! `VideoSource` 구현. `play()` 이전과 `detach()` 이후에는 데이터가 없다.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::RgbaImage;
use qrwatch_core::error::CoreError;
use qrwatch_core::models::frame::{FrameView, ReadyState};
use qrwatch_core::ports::video::VideoSource;
use tracing::{debug, info};

/// 읽어들이는 이미지 확장자
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];

/// 이미지 시퀀스 재생기
pub struct ImageSequenceSource {
    frames: Vec<RgbaImage>,
    frame_duration: Duration,
    looping: bool,
    started_at: Option<Instant>,
    detached: bool,
}

impl ImageSequenceSource {
    /// 메모리의 프레임으로 생성 (비어 있으면 오류)
    pub fn from_frames(
        frames: Vec<RgbaImage>,
        frame_duration: Duration,
        looping: bool,
    ) -> Result<Self, CoreError> {
        if frames.is_empty() {
            return Err(CoreError::Video("재생할 프레임이 없음".to_string()));
        }
        if frame_duration.is_zero() {
            return Err(CoreError::validation("frame_duration", "0보다 커야 함"));
        }
        Ok(Self {
            frames,
            frame_duration,
            looping,
            started_at: None,
            detached: false,
        })
    }

    /// 디렉토리의 이미지 파일을 이름순으로 읽는다. 이미지가 아닌 파일은 건너뛴다.
    pub fn from_dir(dir: &Path, frame_duration: Duration, looping: bool) -> Result<Self, CoreError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image_path(path))
            .collect();
        paths.sort();

        let frames = paths
            .iter()
            .map(|path| load_frame(path))
            .collect::<Result<Vec<_>, _>>()?;
        info!("이미지 시퀀스 로드: {} ({}장)", dir.display(), frames.len());

        Self::from_frames(frames, frame_duration, looping)
    }

    /// 단일 이미지 (루프 여부와 무관하게 끝나지 않는 정지 화면)
    pub fn from_file(path: &Path, frame_duration: Duration) -> Result<Self, CoreError> {
        let frame = load_frame(path)?;
        info!("단일 이미지 로드: {}", path.display());
        Self::from_frames(vec![frame], frame_duration, true)
    }

    /// 경로 종류에 따라 `from_dir` / `from_file`
    pub fn open(path: &Path, frame_duration: Duration, looping: bool) -> Result<Self, CoreError> {
        if path.is_dir() {
            Self::from_dir(path, frame_duration, looping)
        } else {
            Self::from_file(path, frame_duration)
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// `now` 시점에 보여줄 프레임 인덱스. 재생 전/분리 후/끝난 뒤에는 `None`.
    pub fn index_at(&self, now: Instant) -> Option<usize> {
        if self.detached {
            return None;
        }
        let started = self.started_at?;
        let elapsed = now.saturating_duration_since(started);
        let step = (elapsed.as_nanos() / self.frame_duration.as_nanos()) as usize;

        if self.looping {
            Some(step % self.frames.len())
        } else if step < self.frames.len() {
            Some(step)
        } else {
            None
        }
    }

    fn ended_at(&self, now: Instant) -> bool {
        !self.looping && self.started_at.is_some() && self.index_at(now).is_none()
    }

    fn frame_at(&self, now: Instant) -> Option<&RgbaImage> {
        self.index_at(now).and_then(|i| self.frames.get(i))
    }
}

impl VideoSource for ImageSequenceSource {
    fn play(&mut self) -> Result<(), CoreError> {
        if self.detached {
            return Err(CoreError::Video("분리된 소스는 재생할 수 없음".to_string()));
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
            debug!("이미지 시퀀스 재생 시작");
        }
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        let now = Instant::now();
        if self.frame_at(now).is_some() {
            ReadyState::HaveEnoughData
        } else if self.ended_at(now) && !self.detached {
            ReadyState::HaveCurrentData
        } else {
            ReadyState::HaveNothing
        }
    }

    fn current_frame(&self) -> Option<FrameView<'_>> {
        self.frame_at(Instant::now())
            .map(|f| FrameView::new(f.as_raw(), f.width(), f.height()))
    }

    fn is_ended(&self) -> bool {
        self.ended_at(Instant::now())
    }

    fn detach(&mut self) {
        if !self.detached {
            self.detached = true;
            debug!("이미지 시퀀스 분리");
        }
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn load_frame(path: &Path) -> Result<RgbaImage, CoreError> {
    let image = image::open(path)
        .map_err(|e| CoreError::Video(format!("이미지 읽기 실패 {}: {e}", path.display())))?;
    Ok(image.to_rgba8())
}
