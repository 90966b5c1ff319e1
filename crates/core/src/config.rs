//! 설정 관리 -- shipcheck.toml 파싱 및 런타임 설정
//!
//! [`ShipcheckConfig`]는 실행 타이밍, Helm 호출, 로깅 설정을 담습니다.
//! 플랜 문서(무엇을 테스트할지)와 달리, 이 설정은 어떻게 실행할지를 정합니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SHIPCHECK_RUN_DEADLINE_SECS=600` 형식)
//! 3. 설정 파일 (`--config shipcheck.toml`, 선택)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), shipcheck_core::error::ShipcheckError> {
//! use shipcheck_core::config::ShipcheckConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ShipcheckConfig::load("shipcheck.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ShipcheckConfig::parse("[readiness]\npoll_interval_ms = 1000")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ShipcheckError};

/// 상한값 상수
const MAX_DEADLINE_SECS: u64 = 24 * 3600;
const MAX_POLL_INTERVAL_MS: u64 = 10 * 60 * 1000;
const MAX_HELM_TIMEOUT_SECS: u64 = 6 * 3600;
const MAX_TEARDOWN_GRACE_SECS: u64 = 3600;

/// shipcheck 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipcheckConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 실행 전체 설정
    #[serde(default)]
    pub run: RunConfig,
    /// 준비 상태 체크 설정
    #[serde(default)]
    pub readiness: ReadinessConfig,
    /// Helm 호출 설정
    #[serde(default)]
    pub helm: HelmConfig,
}

impl ShipcheckConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ShipcheckError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일 없이 기본값 + 환경변수 오버라이드로 설정을 생성합니다.
    pub fn from_env() -> Result<Self, ShipcheckError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ShipcheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| crate::plan::read_error(&path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|e| {
            ShipcheckError::Config(ConfigError::ParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ShipcheckError> {
        toml::from_str(toml_str).map_err(|e| {
            ShipcheckError::Config(ConfigError::ParseFailed {
                path: "<inline>".to_owned(),
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SHIPCHECK_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SHIPCHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SHIPCHECK_GENERAL_LOG_FORMAT");

        // Run
        override_u64(&mut self.run.deadline_secs, "SHIPCHECK_RUN_DEADLINE_SECS");

        // Readiness
        override_u64(
            &mut self.readiness.poll_interval_ms,
            "SHIPCHECK_READINESS_POLL_INTERVAL_MS",
        );

        // Helm
        override_string(&mut self.helm.binary, "SHIPCHECK_HELM_BINARY");
        override_u64(
            &mut self.helm.install_timeout_secs,
            "SHIPCHECK_HELM_INSTALL_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.helm.uninstall_timeout_secs,
            "SHIPCHECK_HELM_UNINSTALL_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.helm.teardown_grace_secs,
            "SHIPCHECK_HELM_TEARDOWN_GRACE_SECS",
        );
        override_string(
            &mut self.helm.fullname_override_key,
            "SHIPCHECK_HELM_FULLNAME_OVERRIDE_KEY",
        );
        override_string(
            &mut self.helm.fullname_prefix,
            "SHIPCHECK_HELM_FULLNAME_PREFIX",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ShipcheckError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        check_range("run.deadline_secs", self.run.deadline_secs, MAX_DEADLINE_SECS)?;
        check_range(
            "readiness.poll_interval_ms",
            self.readiness.poll_interval_ms,
            MAX_POLL_INTERVAL_MS,
        )?;
        check_range(
            "helm.install_timeout_secs",
            self.helm.install_timeout_secs,
            MAX_HELM_TIMEOUT_SECS,
        )?;
        check_range(
            "helm.uninstall_timeout_secs",
            self.helm.uninstall_timeout_secs,
            MAX_HELM_TIMEOUT_SECS,
        )?;

        // grace 0은 허용 (즉시 uninstall)
        if self.helm.teardown_grace_secs > MAX_TEARDOWN_GRACE_SECS {
            return Err(invalid(
                "helm.teardown_grace_secs",
                format!("must be 0-{MAX_TEARDOWN_GRACE_SECS}"),
            ));
        }

        if self.helm.binary.trim().is_empty() {
            return Err(invalid("helm.binary", "must not be empty".to_owned()));
        }

        if self.helm.fullname_override_key.trim().is_empty() {
            return Err(invalid(
                "helm.fullname_override_key",
                "must not be empty".to_owned(),
            ));
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 실행 전체 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 모든 플랜이 공유하는 데드라인 (초)
    pub deadline_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { deadline_secs: 900 }
    }
}

impl RunConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

/// 준비 상태 체크 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// 폴링 주기 (밀리초)
    pub poll_interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
        }
    }
}

impl ReadinessConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Helm 호출 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    /// helm 실행 파일
    pub binary: String,
    /// `helm install --timeout` (초)
    pub install_timeout_secs: u64,
    /// `helm uninstall --timeout` (초)
    pub uninstall_timeout_secs: u64,
    /// 테스트 종료 후 uninstall 전 대기 시간 (초)
    pub teardown_grace_secs: u64,
    /// 인스턴스 고유화를 위한 오버라이드 키
    pub fullname_override_key: String,
    /// 오버라이드 값 접두사 (비어 있으면 릴리스 이름 사용)
    pub fullname_prefix: String,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: "helm".to_owned(),
            install_timeout_secs: 900,
            uninstall_timeout_secs: 900,
            teardown_grace_secs: 60,
            fullname_override_key: "fullnameOverride".to_owned(),
            fullname_prefix: String::new(),
        }
    }
}

impl HelmConfig {
    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn uninstall_timeout(&self) -> Duration {
        Duration::from_secs(self.uninstall_timeout_secs)
    }

    pub fn teardown_grace(&self) -> Duration {
        Duration::from_secs(self.teardown_grace_secs)
    }
}

fn invalid(field: &str, reason: String) -> ShipcheckError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

fn check_range(field: &str, value: u64, max: u64) -> Result<(), ShipcheckError> {
    if value == 0 || value > max {
        return Err(invalid(field, format!("must be 1-{max}")));
    }
    Ok(())
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
