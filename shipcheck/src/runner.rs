//! Test Runner -- 플랜 하나의 체크를 병렬 실행하는 fail-fast 그룹
//!
//! 모든 체크는 동시에 시작됩니다. 첫 번째로 실패한 체크가 그룹 컨텍스트를
//! 취소하고, 나머지 체크는 다음 대기 지점에서 취소를 관찰합니다.
//! 러너는 모든 체크가 끝날 때까지 기다린 뒤 첫 번째 에러만 반환합니다.
//!
//! 그룹 컨텍스트는 상위 컨텍스트의 자식이므로, 체크 실패가
//! 다른 플랜까지 직접 취소하지는 않습니다.

use tokio::task::JoinSet;
use tracing::{Instrument, debug, warn};

use shipcheck_core::context::RunContext;
use shipcheck_core::error::CheckError;
use shipcheck_core::plan::TestSpec;
use shipcheck_readiness::{ReadinessPoller, RequestCounts, UrlProbe};

use crate::report::CheckReport;

/// 체크 실행 결과: 선언 순서대로의 체크 리포트와 대표 에러
#[derive(Debug)]
pub struct TestRunOutcome {
    pub checks: Vec<CheckReport>,
    pub result: Result<(), CheckError>,
}

/// 플랜 단위 체크 실행기
pub struct TestRunner<U: UrlProbe> {
    poller: ReadinessPoller<U>,
}

impl<U: UrlProbe> TestRunner<U> {
    pub fn new(poller: ReadinessPoller<U>) -> Self {
        Self { poller }
    }

    /// 모든 체크를 병렬로 실행합니다. 체크가 없으면 즉시 성공합니다.
    pub async fn run(&self, tests: &[TestSpec], ordinal: usize, ctx: &RunContext) -> TestRunOutcome {
        let group = ctx.child();
        let mut set = JoinSet::new();

        debug!(ordinal, checks = tests.len(), "running checks");

        for (index, spec) in tests.iter().cloned().enumerate() {
            let poller = self.poller.clone();
            let group = group.clone();
            set.spawn(
                async move {
                    let (report, result) = run_check(&poller, spec, &group).await;
                    (index, report, result)
                }
                .in_current_span(),
            );
        }

        let mut checks: Vec<Option<CheckReport>> = vec![None; tests.len()];
        let mut first_error: Option<CheckError> = None;

        while let Some(joined) = set.join_next().await {
            let result = match joined {
                Ok((index, report, result)) => {
                    checks[index] = Some(report);
                    result
                }
                Err(e) => {
                    warn!(ordinal, error = %e, "check task aborted");
                    Err(CheckError::Aborted(e.to_string()))
                }
            };

            if let Err(e) = result
                && first_error.is_none()
            {
                warn!(ordinal, error = %e, "check failed, cancelling remaining checks");
                group.cancel();
                first_error = Some(e);
            }
        }

        // 결과 없이 끝난 태스크는 aborted로 채움
        let checks = checks
            .into_iter()
            .zip(tests)
            .map(|(report, spec)| {
                report.unwrap_or_else(|| {
                    CheckReport::aborted(spec, "check task aborted".to_owned())
                })
            })
            .collect();

        TestRunOutcome {
            checks,
            result: first_error.map_or(Ok(()), Err),
        }
    }
}

async fn run_check<U: UrlProbe>(
    poller: &ReadinessPoller<U>,
    spec: TestSpec,
    ctx: &RunContext,
) -> (CheckReport, Result<(), CheckError>) {
    match spec {
        TestSpec::WaitUrlReady(check) => {
            let mut counts = RequestCounts::default();
            let result = poller
                .run(&check, &mut counts, ctx)
                .await
                .map_err(CheckError::from);
            let error = result.as_ref().err().map(ToString::to_string);
            (CheckReport::wait_url_ready(&check, counts, error), result)
        }
        TestSpec::Noop => (CheckReport::noop(), Ok(())),
    }
}
