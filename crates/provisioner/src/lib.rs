#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`ProvisionerError`)
//! - [`helm`]: 패키지 매니저 추상화 (`PackageManager` trait, `HelmCli`)
//! - [`release`]: 릴리스 식별자, 설치, teardown 가드 (`Provisioner`, `ReleaseGuard`)

pub mod error;
pub mod helm;
pub mod release;

pub use error::ProvisionerError;
pub use helm::{HelmCli, InstallRequest, PackageManager, UninstallRequest};
pub use release::{Provisioner, ReleaseGuard, ReleaseIdentity, TeardownOutcome};
