//! # qrwatch-core
//!
//! QRWATCH 도메인 모델, 포트(trait) 정의, 에러 타입, 설정.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 도메인 데이터 구조체 (스캔 영역, 색상, 검출 결과, 프레임 버퍼)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스 (디코더, 캔버스, 비디오, 스케줄러)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 스캐너/호스트 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
