//! 패키지 매니저 추상화 -- 테스트 가능성을 위한 trait
//!
//! [`PackageManager`] trait은 외부 install/uninstall 명령을 추상화합니다.
//! 프로덕션 코드는 [`HelmCli`]를, 테스트는 `MockPackageManager`를 사용합니다.
//!
//! ```text
//!   ┌─────────────┐
//!   │ Provisioner │
//!   └──────┬──────┘
//!          ▼
//!   ┌────────────────┐
//!   │ PackageManager │ (trait)
//!   └────────────────┘
//!       │        │
//!       ▼        ▼
//!   ┌───────┐ ┌──────┐
//!   │HelmCli│ │ Mock │
//!   └───┬───┘ └──────┘
//!       ▼
//!   helm 바이너리
//! ```

use std::future::Future;
use std::time::Duration;

use crate::error::ProvisionerError;

/// 설치 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// 고유 릴리스 식별자
    pub release: String,
    /// 차트 참조
    pub chart: String,
    /// 대상 네임스페이스
    pub namespace: String,
    /// `--set` 오버라이드 (순서대로 적용)
    pub overrides: Vec<(String, String)>,
    /// `--values` 파일 (순서대로 적용)
    pub values_files: Vec<String>,
    /// 리소스 준비 완료까지 대기
    pub wait: bool,
    /// 실패 시 롤백
    pub atomic: bool,
    /// 명령 타임아웃
    pub timeout: Duration,
}

impl InstallRequest {
    /// helm 인자 목록을 생성합니다.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "install".to_owned(),
            self.release.clone(),
            self.chart.clone(),
            "--namespace".to_owned(),
            self.namespace.clone(),
        ];
        if self.wait {
            args.push("--wait".to_owned());
        }
        args.push("--timeout".to_owned());
        args.push(format_timeout(self.timeout));
        if self.atomic {
            args.push("--atomic".to_owned());
        }
        for (key, value) in &self.overrides {
            args.push("--set".to_owned());
            args.push(format!("{key}={value}"));
        }
        for file in &self.values_files {
            args.push("--values".to_owned());
            args.push(file.clone());
        }
        args
    }
}

/// 제거 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallRequest {
    pub release: String,
    pub namespace: String,
    pub wait: bool,
    pub timeout: Duration,
}

impl UninstallRequest {
    /// helm 인자 목록을 생성합니다.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "uninstall".to_owned(),
            self.release.clone(),
            "--namespace".to_owned(),
            self.namespace.clone(),
        ];
        if self.wait {
            args.push("--wait".to_owned());
        }
        args.push("--timeout".to_owned());
        args.push(format_timeout(self.timeout));
        args
    }
}

fn format_timeout(timeout: Duration) -> String {
    format!("{}s", timeout.as_secs())
}

/// 외부 패키지 매니저 trait
///
/// 두 메서드 모두 성공 시 명령 출력(stdout + stderr)을 반환합니다.
/// 실패 시 [`ProvisionerError::CommandFailed`]에 출력이 담깁니다.
pub trait PackageManager: Send + Sync + 'static {
    /// 차트를 설치합니다.
    fn install(
        &self,
        request: &InstallRequest,
    ) -> impl Future<Output = Result<String, ProvisionerError>> + Send;

    /// 릴리스를 제거합니다.
    fn uninstall(
        &self,
        request: &UninstallRequest,
    ) -> impl Future<Output = Result<String, ProvisionerError>> + Send;
}

/// `helm` 바이너리를 호출하는 프로덕션 구현
pub struct HelmCli {
    binary: String,
}

impl HelmCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(
        &self,
        action: &'static str,
        release: &str,
        args: Vec<String>,
    ) -> Result<String, ProvisionerError> {
        tracing::debug!(binary = %self.binary, ?args, "running helm");

        let output = tokio::process::Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|e| ProvisionerError::Spawn {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(ProvisionerError::CommandFailed {
                action,
                release: release.to_owned(),
                status: output.status.to_string(),
                output: combined,
            })
        }
    }
}

impl Default for HelmCli {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl PackageManager for HelmCli {
    async fn install(&self, request: &InstallRequest) -> Result<String, ProvisionerError> {
        self.run("install", &request.release, request.to_args())
            .await
    }

    async fn uninstall(&self, request: &UninstallRequest) -> Result<String, ProvisionerError> {
        self.run("uninstall", &request.release, request.to_args())
            .await
    }
}

/// 테스트용 Mock 패키지 매니저
///
/// 호출 기록을 남기고, 설정에 따라 실패를 시뮬레이션합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockPackageManager {
    pub installs: std::sync::Mutex<Vec<InstallRequest>>,
    pub uninstalls: std::sync::Mutex<Vec<UninstallRequest>>,
    pub fail_install: bool,
    pub fail_uninstall: bool,
}

#[cfg(test)]
impl MockPackageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub fn with_failing_uninstall(mut self) -> Self {
        self.fail_uninstall = true;
        self
    }

    pub fn uninstall_count(&self) -> usize {
        self.uninstalls.lock().unwrap().len()
    }
}

#[cfg(test)]
impl PackageManager for MockPackageManager {
    async fn install(&self, request: &InstallRequest) -> Result<String, ProvisionerError> {
        self.installs.lock().unwrap().push(request.clone());
        if self.fail_install {
            return Err(ProvisionerError::CommandFailed {
                action: "install",
                release: request.release.clone(),
                status: "exit status: 1".to_owned(),
                output: "mock failure".to_owned(),
            });
        }
        Ok(format!("release \"{}\" installed", request.release))
    }

    async fn uninstall(&self, request: &UninstallRequest) -> Result<String, ProvisionerError> {
        self.uninstalls.lock().unwrap().push(request.clone());
        if self.fail_uninstall {
            return Err(ProvisionerError::CommandFailed {
                action: "uninstall",
                release: request.release.clone(),
                status: "exit status: 1".to_owned(),
                output: "mock failure".to_owned(),
            });
        }
        Ok(format!("release \"{}\" uninstalled", request.release))
    }
}
