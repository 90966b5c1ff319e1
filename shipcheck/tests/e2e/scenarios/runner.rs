//! Test Runner: 병렬 체크 실행과 fail-fast 취소

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use shipcheck::report::Status;
use shipcheck_core::context::{Interrupt, RunContext};
use shipcheck_core::error::CheckError;
use shipcheck_core::plan::TestSpec;

use crate::helpers::fakes::FakeProbe;
use crate::helpers::plans::{POLL_INTERVAL, runner, wait};

#[tokio::test(start_paused = true)]
async fn all_checks_succeed_in_declared_order() {
    let probe = Arc::new(
        FakeProbe::new()
            .always("http://a", Some(200))
            .scripted("http://b", vec![Some(503), None], Some(200)),
    );
    let tests = vec![wait("http://a", None), wait("http://b", Some(5))];

    let outcome = runner(&probe).run(&tests, 1, &RunContext::new()).await;

    assert!(outcome.result.is_ok());
    assert_eq!(outcome.checks.len(), 2);
    assert_eq!(outcome.checks[0].url.as_deref(), Some("http://a"));
    assert_eq!(outcome.checks[0].attempts, 1);
    assert_eq!(outcome.checks[1].url.as_deref(), Some("http://b"));
    assert_eq!(outcome.checks[1].attempts, 3);
    assert_eq!(outcome.checks[1].successes, 1);
    assert!(outcome.checks.iter().all(|c| c.status == Status::Succeeded));
}

#[tokio::test(start_paused = true)]
async fn no_checks_succeed_immediately() {
    let probe = Arc::new(FakeProbe::new());
    let started = Instant::now();

    let outcome = runner(&probe).run(&[], 1, &RunContext::new()).await;

    assert!(outcome.result.is_ok());
    assert!(outcome.checks.is_empty());
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn noop_check_succeeds_without_probing() {
    let probe = Arc::new(FakeProbe::new());

    let outcome = runner(&probe)
        .run(&[TestSpec::Noop], 1, &RunContext::new())
        .await;

    assert!(outcome.result.is_ok());
    assert_eq!(outcome.checks[0].kind, "noop");
    assert_eq!(probe.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn first_failure_cancels_sibling_checks() {
    let probe = Arc::new(
        FakeProbe::new()
            .always("http://limited", Some(503))
            .always("http://unlimited", Some(503)),
    );
    let tests = vec![wait("http://limited", Some(2)), wait("http://unlimited", None)];
    let ctx = RunContext::new();
    let started = Instant::now();

    let outcome = runner(&probe).run(&tests, 1, &ctx).await;

    assert_eq!(
        outcome.result,
        Err(CheckError::MaxRetriesExceeded { limit: 2 })
    );
    // 세 번째 tick에서 한도 초과
    assert_eq!(started.elapsed(), POLL_INTERVAL * 3);
    assert_eq!(probe.calls("http://limited"), 2);

    let sibling = &outcome.checks[1];
    assert_eq!(sibling.status, Status::Failed);
    assert_eq!(sibling.error.as_deref(), Some("context canceled"));

    // 그룹 취소는 상위 컨텍스트로 번지지 않음
    assert_eq!(ctx.interrupted(), None);
}

#[tokio::test(start_paused = true)]
async fn unready_check_fails_at_deadline() {
    let probe = Arc::new(FakeProbe::new().always("http://redirect", Some(302)));
    let ctx = RunContext::with_timeout(Duration::from_secs(30));

    let outcome = runner(&probe)
        .run(&[wait("http://redirect", None)], 1, &ctx)
        .await;

    assert_eq!(
        outcome.result,
        Err(CheckError::Interrupted(Interrupt::DeadlineExceeded))
    );
    assert_eq!(outcome.checks[0].successes, 0);
}

#[tokio::test(start_paused = true)]
async fn panicking_check_fails_the_group() {
    let probe = Arc::new(
        FakeProbe::new()
            .panicking("http://boom")
            .always("http://slow", Some(503)),
    );
    let tests = vec![wait("http://boom", None), wait("http://slow", None)];

    let outcome = runner(&probe).run(&tests, 1, &RunContext::new()).await;

    assert!(matches!(outcome.result, Err(CheckError::Aborted(_))));
    assert_eq!(outcome.checks[0].status, Status::Failed);
    assert_eq!(outcome.checks[0].url.as_deref(), Some("http://boom"));
    assert_eq!(outcome.checks[1].error.as_deref(), Some("context canceled"));
}
