//! # qrwatch-vision
//!
//! 실시간 QR 스캔 루프.
//! 프레임 샘플링 루프, 스캔 영역 기하, 디코드-보고 프로토콜,
//! 검출 상태를 보여주는 오버레이 드로잉을 담당한다.
//!
//! 틱 흐름: 루프 드라이버 → 스캔 기하 → 렌더러(마스크) → 디코더 어댑터
//! → 렌더러(외곽선) → 호출자에 페이로드 보고.

pub mod canvas;
pub mod detector;
pub mod frame_queue;
pub mod geometry;
pub mod renderer;
pub mod rqrr_decoder;
pub mod scan_loop;
pub mod scanner;
pub mod sequence;

#[cfg(test)]
mod testing;
