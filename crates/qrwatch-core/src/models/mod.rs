//! 도메인 모델.

pub mod color;
pub mod detection;
pub mod frame;
pub mod geometry;
