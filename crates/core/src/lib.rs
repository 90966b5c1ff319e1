#![doc = include_str!("../README.md")]

pub mod config;
pub mod context;
pub mod error;
pub mod plan;

// --- 주요 타입 re-export ---

// 에러
pub use error::{CheckError, ConfigError, ProvisionError, ShipcheckError};

// 설정
pub use config::ShipcheckConfig;

// 실행 컨텍스트
pub use context::{Interrupt, RunContext};

// 플랜 모델
pub use plan::{HelmInstall, Install, Plan, PlanSet, TestSpec, WaitUrlReady};
