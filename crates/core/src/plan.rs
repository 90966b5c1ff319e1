//! 플랜 모델 -- 플랜 문서(YAML) 파싱 및 검증
//!
//! ```yaml
//! plans:
//!   - name: smoke
//!     install:
//!       helm:
//!         chart: ./charts/app
//!         release-name: app
//!         namespace: ci
//!         set:
//!           replicaCount: 1
//!         values-files:
//!           - values/ci.yaml
//!     tests:
//!       - wait-url-ready:
//!           url: http://app-1.ci.svc/healthz
//!           retries: 60
//!           expected-status-code: 200
//! ```
//!
//! [`PlanSet`]은 시작 시 한 번 생성된 뒤 읽기 전용입니다.
//! 체크별 결과 누적값은 모델에 두지 않고, 체크를 실행하는 태스크가 소유합니다.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, ShipcheckError};

/// 플랜 문서 최대 크기
const MAX_PLAN_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// 플랜 문서 최상위 구조
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSet {
    /// 서로 독립적인 플랜 목록 (모두 병렬 실행)
    #[serde(default)]
    pub plans: Vec<Plan>,
}

/// 독립적인 프로비저닝 + 테스트 단위
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// 플랜 이름
    pub name: String,
    /// 설치 단계 (없으면 바로 테스트 단계로 진행)
    #[serde(default)]
    pub install: Install,
    /// 테스트 목록 (비어 있으면 설치만 수행하는 스모크 테스트)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<TestSpec>,
}

/// 설치 단계 정의
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Install {
    /// Helm 차트 설치
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm: Option<HelmInstall>,
}

/// Helm 설치 사양
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelmInstall {
    /// 차트 참조 (경로, repo/name, OCI 참조)
    pub chart: String,
    /// 릴리스 이름 템플릿 (플랜 순번과 결합되어 고유해짐)
    #[serde(rename = "release-name")]
    pub release_name: String,
    /// 대상 네임스페이스
    pub namespace: String,
    /// `--set` 오버라이드 (키 순서대로 적용)
    #[serde(
        rename = "set",
        default,
        deserialize_with = "deserialize_scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub sets: BTreeMap<String, String>,
    /// `--values` 파일 (선언 순서대로 적용)
    #[serde(
        rename = "values-files",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub values_files: Vec<String>,
}

/// URL 준비 상태 체크
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitUrlReady {
    /// 대상 URL
    pub url: String,
    /// 최대 시도 횟수 (없으면 데드라인까지 무제한)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// 기대 상태 코드
    #[serde(rename = "expected-status-code")]
    pub expected_status_code: u16,
}

/// 테스트 사양 -- 닫힌 variant 집합
///
/// 새 체크 종류는 variant와 Test Runner의 핸들러만 추가하면 됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TestEntry", into = "TestEntry")]
pub enum TestSpec {
    /// URL이 기대 상태 코드를 반환할 때까지 폴링
    WaitUrlReady(WaitUrlReady),
    /// 인식되지 않거나 비어 있는 항목 (즉시 성공)
    Noop,
}

impl TestSpec {
    /// 로그/리포트용 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WaitUrlReady(_) => "wait-url-ready",
            Self::Noop => "noop",
        }
    }
}

/// 문서 상의 테스트 항목 형태
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TestEntry {
    #[serde(
        rename = "wait-url-ready",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    wait_url_ready: Option<WaitUrlReady>,
}

impl From<TestEntry> for TestSpec {
    fn from(entry: TestEntry) -> Self {
        match entry.wait_url_ready {
            Some(check) => Self::WaitUrlReady(check),
            None => Self::Noop,
        }
    }
}

impl From<TestSpec> for TestEntry {
    fn from(spec: TestSpec) -> Self {
        match spec {
            TestSpec::WaitUrlReady(check) => Self {
                wait_url_ready: Some(check),
            },
            TestSpec::Noop => Self::default(),
        }
    }
}

/// 파일 읽기 실패는 모두 설정 에러로 분류
pub(crate) fn read_error(path: &str, e: std::io::Error) -> ShipcheckError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ConfigError::FileNotFound {
            path: path.to_owned(),
        }
        .into()
    } else {
        ConfigError::Unreadable {
            path: path.to_owned(),
            reason: e.to_string(),
        }
        .into()
    }
}

impl PlanSet {
    /// 플랜 문서를 읽고 파싱한 뒤 검증합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ShipcheckError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| read_error(&shown, e))?;

        if metadata.len() > MAX_PLAN_FILE_SIZE {
            return Err(ConfigError::ParseFailed {
                path: shown,
                reason: format!(
                    "file too large: {} bytes (max: {MAX_PLAN_FILE_SIZE})",
                    metadata.len()
                ),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| read_error(&shown, e))?;
        let plans = Self::parse(&content).map_err(|e| match e {
            ShipcheckError::Config(ConfigError::ParseFailed { reason, .. }) => {
                ShipcheckError::Config(ConfigError::ParseFailed {
                    path: shown.clone(),
                    reason,
                })
            }
            other => other,
        })?;
        plans.validate()?;

        tracing::info!(path = %shown, plans = plans.plans.len(), "loaded plan document");
        Ok(plans)
    }

    /// YAML 문자열에서 플랜 문서를 파싱합니다 (검증 없음).
    pub fn parse(yaml: &str) -> Result<Self, ShipcheckError> {
        // 빈 문서는 빈 플랜 목록
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| {
            ShipcheckError::Config(ConfigError::ParseFailed {
                path: "<inline>".to_owned(),
                reason: e.to_string(),
            })
        })
    }

    /// 플랜 문서의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ShipcheckError> {
        if self.plans.is_empty() {
            tracing::warn!("plan document contains no plans");
        }

        for (idx, plan) in self.plans.iter().enumerate() {
            let at = format!("plans[{idx}]");

            if plan.name.trim().is_empty() {
                return Err(invalid(format!("{at}.name"), "must not be empty"));
            }

            if let Some(helm) = &plan.install.helm {
                for (field, value) in [
                    ("chart", &helm.chart),
                    ("release-name", &helm.release_name),
                    ("namespace", &helm.namespace),
                ] {
                    if value.trim().is_empty() {
                        return Err(invalid(
                            format!("{at}.install.helm.{field}"),
                            "must not be empty",
                        ));
                    }
                }
            }

            for (test_idx, test) in plan.tests.iter().enumerate() {
                if let TestSpec::WaitUrlReady(check) = test {
                    let field = format!("{at}.tests[{test_idx}].wait-url-ready");
                    if check.url.trim().is_empty() {
                        return Err(invalid(format!("{field}.url"), "must not be empty"));
                    }
                    if !(100..=599).contains(&check.expected_status_code) {
                        return Err(invalid(
                            format!("{field}.expected-status-code"),
                            "must be 100-599",
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

fn invalid(field: String, reason: &str) -> ShipcheckError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_owned(),
    }
    .into()
}

/// `set` 값으로 문자열뿐 아니라 숫자/불리언 스칼라도 허용합니다.
fn deserialize_scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = BTreeMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => String::new(),
                _ => {
                    return Err(D::Error::custom(format!(
                        "set.{key}: expected a scalar value"
                    )));
                }
            };
            Ok((key, value))
        })
        .collect()
}
