//! 에러 타입 -- 도메인별 에러 정의
//!
//! 실행 단계별로 에러를 나눕니다.
//! - [`ConfigError`]: 실행 전 설정/플랜 문서 에러 (치명적, 오케스트레이션 시작 전 종료)
//! - [`ProvisionError`]: 차트 설치 실패 (해당 플랜만 실패)
//! - [`CheckError`]: 준비 상태 체크 실패 (해당 플랜 실패, 형제 체크 취소)
//!
//! 프로브 전송 에러는 폴러 내부에서 흡수되므로 여기 나타나지 않습니다.

use crate::context::Interrupt;

/// shipcheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ShipcheckError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 프로비저닝 에러
    #[error("provision error: {0}")]
    Provision(#[from] ProvisionError),

    /// 체크 실패
    #[error("check failed: {0}")]
    Check(#[from] CheckError),

    /// 공유 컨텍스트 중단 (데드라인 또는 취소)
    #[error("{0}")]
    Interrupted(#[from] Interrupt),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShipcheckError {
    /// 실행 시작 전에 발생하는 설정 계열 에러인지 여부
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 파일을 찾을 수 없음
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// 파일을 읽을 수 없음 (권한, 디렉터리, UTF-8 아님 등)
    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// 파싱 실패
    #[error("failed to parse {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 필수 환경변수 누락
    #[error("environment variable '{name}' not set")]
    MissingEnv { name: String },
}

/// 프로비저닝 에러
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// 설치 명령 실패
    #[error("install of release '{release}' failed: {reason}")]
    InstallFailed { release: String, reason: String },

    /// 외부 명령 실행 불가
    #[error("failed to run '{binary}': {reason}")]
    Command { binary: String, reason: String },
}

/// 체크 실패
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// 최대 시도 횟수 초과
    #[error("reached max retries ({limit})")]
    MaxRetriesExceeded { limit: u32 },

    /// 공유 컨텍스트 중단
    #[error("{0}")]
    Interrupted(Interrupt),

    /// 프로브 준비 실패 (클라이언트 생성 등)
    #[error("probe error: {0}")]
    Probe(String),

    /// 체크 태스크 비정상 종료
    #[error("check task aborted: {0}")]
    Aborted(String),
}
