//! Orchestrator: 플랜 병렬 실행, 공유 데드라인, 플랜 간 fail-fast

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use shipcheck::report::Status;
use shipcheck_core::plan::PlanSet;

use crate::helpers::fakes::{FakePackageManager, FakeProbe};
use crate::helpers::plans::{RUN_DEADLINE, helm, orchestrator, plan, wait};

#[tokio::test(start_paused = true)]
async fn sibling_success_survives_later_failure() {
    // B는 설치가 느려서 A가 먼저 성공한 뒤에 실패함
    let manager =
        Arc::new(FakePackageManager::new().with_install_delay("slow-2", Duration::from_secs(10)));
    let probe = Arc::new(
        FakeProbe::new()
            .always("http://a", Some(200))
            .always("http://b", Some(200)),
    );
    let plans = PlanSet {
        plans: vec![
            plan("a", None, vec![wait("http://a", None)]),
            plan("b", Some(helm("slow")), vec![wait("http://b", Some(0))]),
        ],
    };

    let report = orchestrator(&manager, &probe, RUN_DEADLINE).run(plans).await;

    assert!(!report.success());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.plans[0].name, "a");
    assert_eq!(report.plans[0].status, Status::Succeeded);
    assert_eq!(report.plans[1].name, "b");
    assert_eq!(report.plans[1].status, Status::Failed);
    assert_eq!(probe.calls("http://b"), 0);
}

#[tokio::test(start_paused = true)]
async fn same_chart_in_two_plans_gets_distinct_releases() {
    let manager = Arc::new(FakePackageManager::new());
    let probe = Arc::new(FakeProbe::new().always("http://app", Some(200)));
    let plans = PlanSet {
        plans: vec![
            plan("first", Some(helm("app")), vec![wait("http://app", None)]),
            plan("second", Some(helm("app")), vec![wait("http://app", None)]),
        ],
    };

    let report = orchestrator(&manager, &probe, RUN_DEADLINE).run(plans).await;

    assert!(report.success());
    assert_eq!(report.plans[0].release.as_deref(), Some("app-1"));
    assert_eq!(report.plans[1].release.as_deref(), Some("app-2"));
    assert_eq!(manager.installed_releases(), vec!["app-1", "app-2"]);

    let overrides: Vec<_> = manager
        .installs()
        .into_iter()
        .map(|r| r.overrides[0].clone())
        .collect();
    assert!(overrides.contains(&("fullnameOverride".to_owned(), "app-1".to_owned())));
    assert!(overrides.contains(&("fullnameOverride".to_owned(), "app-2".to_owned())));

    // 모든 teardown이 끝난 뒤에 반환
    assert_eq!(manager.uninstalled_releases(), vec!["app-1", "app-2"]);
}

#[tokio::test(start_paused = true)]
async fn first_failure_cancels_remaining_plans() {
    let manager = Arc::new(FakePackageManager::new().with_failing_install("bad-1"));
    let probe = Arc::new(FakeProbe::new().always("http://never", Some(503)));
    let plans = PlanSet {
        plans: vec![
            plan("bad", Some(helm("bad")), vec![wait("http://never", None)]),
            plan("waiting", None, vec![wait("http://never", None)]),
        ],
    };
    let started = Instant::now();

    let report = orchestrator(&manager, &probe, RUN_DEADLINE).run(plans).await;

    assert!(!report.success());
    assert_eq!(report.failed_count(), 2);
    assert_eq!(
        report.plans[1].error.as_deref(),
        Some("check failed: context canceled")
    );
    assert!(started.elapsed() < RUN_DEADLINE);
}

#[tokio::test(start_paused = true)]
async fn shared_deadline_fails_unready_plans() {
    let manager = Arc::new(FakePackageManager::new());
    let probe = Arc::new(FakeProbe::new().always("http://redirect", Some(302)));
    let plans = PlanSet {
        plans: vec![plan("redirect", None, vec![wait("http://redirect", None)])],
    };
    let started = Instant::now();

    let report = orchestrator(&manager, &probe, Duration::from_secs(60))
        .run(plans)
        .await;

    assert!(!report.success());
    assert_eq!(
        report.plans[0].error.as_deref(),
        Some("check failed: context deadline exceeded")
    );
    assert_eq!(started.elapsed(), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn empty_plan_set_succeeds() {
    let manager = Arc::new(FakePackageManager::new());
    let probe = Arc::new(FakeProbe::new());

    let report = orchestrator(&manager, &probe, RUN_DEADLINE)
        .run(PlanSet::default())
        .await;

    assert!(report.success());
    assert!(report.plans.is_empty());
}

#[tokio::test(start_paused = true)]
async fn report_carries_run_identity() {
    let manager = Arc::new(FakePackageManager::new());
    let probe = Arc::new(FakeProbe::new());
    let orchestrator = orchestrator(&manager, &probe, RUN_DEADLINE);
    let run_id = orchestrator.run_id().to_owned();

    let report = orchestrator.run(PlanSet::default()).await;

    assert_eq!(report.run_id, run_id);
    assert_eq!(report.run_id.len(), 36);
    assert_eq!(report.job_number, "42");
}

async fn run_ready_and_zero_retry_plans(ready_first: bool) {
    let manager = Arc::new(FakePackageManager::new());
    let probe = Arc::new(
        FakeProbe::new()
            .always("http://ready", Some(200))
            .always("http://limited", Some(200)),
    );
    let ready = plan("ready", None, vec![wait("http://ready", None)]);
    let limited = plan("limited", None, vec![wait("http://limited", Some(0))]);
    let plans = if ready_first {
        vec![ready, limited]
    } else {
        vec![limited, ready]
    };

    let report = orchestrator(&manager, &probe, RUN_DEADLINE)
        .run(PlanSet { plans })
        .await;

    assert!(!report.success());
    let by_name = |name: &str| {
        report
            .plans
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .unwrap()
    };
    assert_eq!(by_name("ready").status, Status::Succeeded);
    let limited = by_name("limited");
    assert_eq!(limited.status, Status::Failed);
    assert_eq!(
        limited.error.as_deref(),
        Some("check failed: reached max retries (0)")
    );
    assert_eq!(probe.calls("http://ready"), 1);
    assert_eq!(probe.calls("http://limited"), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_retry_plan_fails_without_flipping_ready_sibling() {
    run_ready_and_zero_retry_plans(true).await;
}

#[tokio::test(start_paused = true)]
async fn zero_retry_plan_listed_first_fails_without_flipping_ready_sibling() {
    run_ready_and_zero_retry_plans(false).await;
}
