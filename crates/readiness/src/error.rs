//! 준비 상태 체크 에러 타입
//!
//! 전송 계열 에러(`InvalidRequest`, `Transport`)는 폴러 내부에서 흡수되고
//! 다음 tick에 재시도됩니다. 호출 측에는 `MaxRetriesExceeded`와
//! `Interrupted`만 전달됩니다.

use shipcheck_core::context::Interrupt;
use shipcheck_core::error::{CheckError, ShipcheckError};

/// 준비 상태 체크 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ReadinessError {
    /// 최대 시도 횟수 초과
    #[error("failed to fetch: reached max retries ({limit})")]
    MaxRetriesExceeded {
        /// 설정된 최대 시도 횟수
        limit: u32,
    },

    /// 공유 컨텍스트 종료
    #[error("{0}")]
    Interrupted(Interrupt),

    /// 요청 생성 실패
    #[error("failed to create request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    /// 연결/전송 실패
    #[error("failed to make request to {url}: {reason}")]
    Transport { url: String, reason: String },

    /// HTTP 클라이언트 생성 실패
    #[error("http client error: {0}")]
    Client(String),
}

impl From<ReadinessError> for CheckError {
    fn from(err: ReadinessError) -> Self {
        match err {
            ReadinessError::MaxRetriesExceeded { limit } => {
                CheckError::MaxRetriesExceeded { limit }
            }
            ReadinessError::Interrupted(reason) => CheckError::Interrupted(reason),
            other => CheckError::Probe(other.to_string()),
        }
    }
}

impl From<ReadinessError> for ShipcheckError {
    fn from(err: ReadinessError) -> Self {
        ShipcheckError::Check(err.into())
    }
}
