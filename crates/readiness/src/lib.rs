//! # shipcheck-readiness
//!
//! `wait-url-ready` 체크 실행: 고정 주기로 URL을 프로브하여
//! 기대 상태 코드를 한 번 받으면 성공합니다.

pub mod error;
pub mod poller;
pub mod probe;

pub use error::ReadinessError;
pub use poller::{ReadinessPoller, RequestCounts};
pub use probe::{HttpProbe, UrlProbe};
