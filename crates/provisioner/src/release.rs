//! 릴리스 설치 및 지연 teardown
//!
//! [`Provisioner::install`]은 성공 시 [`ReleaseGuard`]를 반환합니다.
//! 가드는 설치 1회당 정확히 하나의 teardown 의무를 가지며,
//! 호출 측 스코프가 어떤 경로로 끝나든 uninstall이 실행됩니다.
//!
//! - 정상 경로: `guard.teardown().await` (grace 대기 후 uninstall, 완료까지 대기)
//! - 그 외 경로 (panic unwinding 등): `Drop`이 현재 런타임에 teardown을 spawn하고,
//!   spawn된 teardown은 [`Provisioner::wait_for_teardowns`]로 기다릴 수 있음
//!
//! teardown 실패는 로그만 남기고 상위로 전파하지 않습니다.
//! teardown 시점에는 이미 테스트 판정이 끝났기 때문입니다.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use shipcheck_core::config::HelmConfig;
use shipcheck_core::plan::HelmInstall;

use crate::error::ProvisionerError;
use crate::helm::{InstallRequest, PackageManager, UninstallRequest};

/// 플랜 순번으로 고유화된 릴리스 식별자
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseIdentity {
    /// 릴리스 이름 (`{release-name}-{ordinal}`)
    pub name: String,
    /// 고유화 오버라이드 키
    pub override_key: String,
    /// 고유화 오버라이드 값 (`{prefix}-{ordinal}`)
    pub override_value: String,
}

impl ReleaseIdentity {
    /// 설치 사양과 1부터 시작하는 플랜 순번으로 식별자를 합성합니다.
    pub fn synthesize(spec: &HelmInstall, ordinal: usize, config: &HelmConfig) -> Self {
        let prefix = if config.fullname_prefix.is_empty() {
            spec.release_name.as_str()
        } else {
            config.fullname_prefix.as_str()
        };
        Self {
            name: format!("{}-{ordinal}", spec.release_name),
            override_key: config.fullname_override_key.clone(),
            override_value: format!("{prefix}-{ordinal}"),
        }
    }
}

/// teardown 결과 (리포트용, 실행 판정에는 영향 없음)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownOutcome {
    Uninstalled,
    Failed(String),
}

/// 차트 설치기
pub struct Provisioner<P: PackageManager> {
    manager: Arc<P>,
    config: HelmConfig,
    background: TaskTracker,
}

impl<P: PackageManager> Provisioner<P> {
    pub fn new(manager: Arc<P>, config: HelmConfig) -> Self {
        Self {
            manager,
            config,
            background: TaskTracker::new(),
        }
    }

    /// `Drop` 경로로 spawn된 teardown이 모두 끝날 때까지 기다립니다.
    pub async fn wait_for_teardowns(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }

    /// 차트를 설치하고 teardown 가드를 반환합니다.
    ///
    /// 설치가 실패하면 아무것도 설치되지 않은 것으로 보고 가드를 만들지 않습니다.
    pub async fn install(
        &self,
        spec: &HelmInstall,
        ordinal: usize,
    ) -> Result<ReleaseGuard<P>, ProvisionerError> {
        let identity = ReleaseIdentity::synthesize(spec, ordinal, &self.config);

        let mut overrides = vec![(
            identity.override_key.clone(),
            identity.override_value.clone(),
        )];
        overrides.extend(spec.sets.iter().map(|(k, v)| (k.clone(), v.clone())));

        let request = InstallRequest {
            release: identity.name.clone(),
            chart: spec.chart.clone(),
            namespace: spec.namespace.clone(),
            overrides,
            values_files: spec.values_files.clone(),
            wait: true,
            atomic: true,
            timeout: self.config.install_timeout(),
        };

        debug!(
            chart = %spec.chart,
            release = %identity.name,
            namespace = %spec.namespace,
            args = ?request.to_args(),
            "installing chart"
        );

        if let Err(e) = self.manager.install(&request).await {
            error!(
                chart = %spec.chart,
                release = %identity.name,
                namespace = %spec.namespace,
                error = %e,
                output = e.output(),
                "failed to install chart"
            );
            return Err(e);
        }

        info!(
            chart = %spec.chart,
            release = %identity.name,
            namespace = %spec.namespace,
            "chart installed"
        );

        Ok(ReleaseGuard {
            release: identity.name.clone(),
            background: self.background.clone(),
            pending: Some(Teardown {
                manager: Arc::clone(&self.manager),
                request: UninstallRequest {
                    release: identity.name,
                    namespace: spec.namespace.clone(),
                    wait: true,
                    timeout: self.config.uninstall_timeout(),
                },
                grace: self.config.teardown_grace(),
            }),
        })
    }
}

/// 설치된 릴리스에 대한 teardown 의무
#[must_use = "dropping the guard schedules teardown in the background; call `teardown().await`"]
pub struct ReleaseGuard<P: PackageManager> {
    release: String,
    background: TaskTracker,
    pending: Option<Teardown<P>>,
}

impl<P: PackageManager> ReleaseGuard<P> {
    /// 설치된 릴리스 이름
    pub fn release(&self) -> &str {
        &self.release
    }

    /// grace 대기 후 uninstall을 실행하고 완료까지 기다립니다.
    ///
    /// 공유 컨텍스트의 취소/데드라인과 무관하게 끝까지 실행됩니다.
    pub async fn teardown(mut self) -> TeardownOutcome {
        match self.pending.take() {
            Some(teardown) => teardown.run().await,
            None => TeardownOutcome::Uninstalled,
        }
    }
}

impl<P: PackageManager> Drop for ReleaseGuard<P> {
    fn drop(&mut self) {
        let Some(teardown) = self.pending.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(
                    release = %self.release,
                    "release guard dropped without teardown, scheduling uninstall in background"
                );
                self.background.spawn_on(
                    async move {
                        teardown.run().await;
                    },
                    &handle,
                );
            }
            Err(_) => {
                error!(
                    release = %self.release,
                    namespace = %teardown.request.namespace,
                    "release guard dropped outside a runtime, release must be removed manually"
                );
            }
        }
    }
}

struct Teardown<P: PackageManager> {
    manager: Arc<P>,
    request: UninstallRequest,
    grace: Duration,
}

impl<P: PackageManager> Teardown<P> {
    async fn run(self) -> TeardownOutcome {
        let release = self.request.release.as_str();
        let namespace = self.request.namespace.as_str();

        debug!(
            release,
            namespace,
            grace_secs = self.grace.as_secs(),
            "uninstalling chart after grace period"
        );
        tokio::time::sleep(self.grace).await;

        debug!(release, namespace, "uninstalling chart");
        match self.manager.uninstall(&self.request).await {
            Ok(_) => {
                info!(release, namespace, "helm uninstall complete");
                TeardownOutcome::Uninstalled
            }
            Err(e) => {
                error!(
                    release,
                    namespace,
                    error = %e,
                    output = e.output(),
                    "failed to uninstall chart"
                );
                TeardownOutcome::Failed(e.to_string())
            }
        }
    }
}
