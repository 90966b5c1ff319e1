//! 프로비저너 에러 타입
//!
//! [`ProvisionerError`]는 외부 패키지 매니저 호출 중 발생하는 에러를 표현합니다.
//! `From<ProvisionerError> for ShipcheckError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use shipcheck_core::error::{ProvisionError, ShipcheckError};

/// 프로비저너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ProvisionerError {
    /// 명령이 0이 아닌 상태로 종료
    #[error("{action} of release '{release}' failed: {status}")]
    CommandFailed {
        /// install / uninstall
        action: &'static str,
        /// 대상 릴리스
        release: String,
        /// 종료 상태
        status: String,
        /// stdout + stderr (진단용)
        output: String,
    },

    /// 명령 실행 자체 실패 (바이너리 없음, 권한 등)
    #[error("failed to spawn '{binary}': {reason}")]
    Spawn {
        /// 실행 파일
        binary: String,
        /// 실패 사유
        reason: String,
    },
}

impl ProvisionerError {
    /// 진단용 명령 출력 (없으면 빈 문자열)
    pub fn output(&self) -> &str {
        match self {
            Self::CommandFailed { output, .. } => output,
            Self::Spawn { .. } => "",
        }
    }
}

impl From<ProvisionerError> for ShipcheckError {
    fn from(err: ProvisionerError) -> Self {
        match err {
            ProvisionerError::CommandFailed {
                action,
                release,
                status,
                ..
            } => ShipcheckError::Provision(ProvisionError::InstallFailed {
                release,
                reason: format!("{action}: {status}"),
            }),
            ProvisionerError::Spawn { binary, reason } => {
                ShipcheckError::Provision(ProvisionError::Command { binary, reason })
            }
        }
    }
}
