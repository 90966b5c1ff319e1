//! Plan builders and component wiring.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use shipcheck::executor::PlanExecutor;
use shipcheck::orchestrator::Orchestrator;
use shipcheck::runner::TestRunner;
use shipcheck_core::config::HelmConfig;
use shipcheck_core::plan::{HelmInstall, Install, Plan, TestSpec, WaitUrlReady};
use shipcheck_provisioner::Provisioner;
use shipcheck_readiness::ReadinessPoller;

use super::fakes::{FakePackageManager, FakeProbe};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const TEARDOWN_GRACE: Duration = Duration::from_secs(60);
pub const RUN_DEADLINE: Duration = Duration::from_secs(900);

pub fn wait(url: &str, retries: Option<u32>) -> TestSpec {
    TestSpec::WaitUrlReady(WaitUrlReady {
        url: url.to_owned(),
        retries,
        expected_status_code: 200,
    })
}

pub fn helm(release_name: &str) -> HelmInstall {
    HelmInstall {
        chart: format!("./charts/{release_name}"),
        release_name: release_name.to_owned(),
        namespace: "ci".to_owned(),
        sets: BTreeMap::new(),
        values_files: Vec::new(),
    }
}

pub fn plan(name: &str, helm: Option<HelmInstall>, tests: Vec<TestSpec>) -> Plan {
    Plan {
        name: name.to_owned(),
        install: Install { helm },
        tests,
    }
}

pub fn runner(probe: &Arc<FakeProbe>) -> TestRunner<FakeProbe> {
    TestRunner::new(ReadinessPoller::new(Arc::clone(probe), POLL_INTERVAL))
}

pub fn executor(
    manager: &Arc<FakePackageManager>,
    probe: &Arc<FakeProbe>,
) -> PlanExecutor<FakePackageManager, FakeProbe> {
    let config = HelmConfig {
        teardown_grace_secs: TEARDOWN_GRACE.as_secs(),
        ..HelmConfig::default()
    };
    PlanExecutor::new(Provisioner::new(Arc::clone(manager), config), runner(probe))
}

pub fn orchestrator(
    manager: &Arc<FakePackageManager>,
    probe: &Arc<FakeProbe>,
    deadline: Duration,
) -> Orchestrator<FakePackageManager, FakeProbe> {
    Orchestrator::new(executor(manager, probe), deadline, "42")
}
