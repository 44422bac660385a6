//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! `qrwatch-vision`이 스캔 루프를 이 trait들 위에 구성하고,
//! 구체 어댑터(rqrr 디코더, 소프트웨어 캔버스, 이미지 시퀀스)를 함께 제공한다.
//!
//! 비동기 초기화가 필요한 포트는 `async_trait` 매크로로 object safety를 보장한다.

pub mod canvas;
pub mod decoder;
pub mod scheduler;
pub mod video;
