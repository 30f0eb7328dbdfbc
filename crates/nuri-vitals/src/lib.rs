//! # nuri-vitals
//!
//! 텔레메트리 수집기.
//! 페이지가 비콘으로 보내는 성능 엔트리를 패밀리별 핸들러로 스냅샷에
//! 반영하고, 등록된 옵저버에게 갱신을 통지한다.
//!
//! ## 기능
//! - 멱등 초기화 (패밀리별 핸들러 등록 + 메모리 폴링 태스크)
//! - 스냅샷 방어적 복사 조회
//! - 등급/점수 요약과 개선 권고가 담긴 리포트 생성
//! - 옵저버 등록/해제, 리스너별 실패 격리

pub mod collector;
pub mod memory;
pub mod report;

pub use collector::VitalsCollector;
pub use memory::MemoryProbe;
