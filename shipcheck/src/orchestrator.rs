//! Orchestrator -- 모든 플랜을 병렬 실행하고 결과를 집계
//!
//! 실행 전체에 하나의 데드라인을 두고, 모든 플랜이 이 컨텍스트를 공유합니다.
//! 첫 번째로 실패한 플랜이 공유 컨텍스트를 취소하면 나머지 플랜은
//! 다음 대기 지점(폴링 tick, 설치 명령 반환)에서 취소를 관찰합니다.
//! 이미 판정이 끝난 플랜의 결과는 바뀌지 않습니다.
//! 모든 플랜과 그 teardown이 끝나야 `run`이 반환됩니다.
//!
//! 각 플랜은 `plan` span 안에서 실행되어 모든 로그에 플랜 이름과 순번이 붙습니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span};

use shipcheck_core::context::RunContext;
use shipcheck_core::plan::PlanSet;
use shipcheck_provisioner::PackageManager;
use shipcheck_readiness::UrlProbe;

use crate::executor::PlanExecutor;
use crate::report::{PlanReport, RunReport};

pub struct Orchestrator<P: PackageManager, U: UrlProbe> {
    executor: Arc<PlanExecutor<P, U>>,
    deadline: Duration,
    run_id: String,
    job_number: String,
}

impl<P: PackageManager, U: UrlProbe> Orchestrator<P, U> {
    /// 실행마다 새 run id(UUID v4)를 발급합니다.
    pub fn new(executor: PlanExecutor<P, U>, deadline: Duration, job_number: impl Into<String>) -> Self {
        Self {
            executor: Arc::new(executor),
            deadline,
            run_id: uuid::Uuid::new_v4().to_string(),
            job_number: job_number.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// 모든 플랜을 실행하고, teardown까지 끝난 뒤 리포트를 반환합니다.
    pub async fn run(&self, plan_set: PlanSet) -> RunReport {
        let ctx = RunContext::with_timeout(self.deadline);
        let names: Vec<String> = plan_set.plans.iter().map(|p| p.name.clone()).collect();

        info!(
            run_id = %self.run_id,
            plans = names.len(),
            deadline_secs = self.deadline.as_secs(),
            "starting plans"
        );

        let mut set = JoinSet::new();
        for (index, plan) in plan_set.plans.into_iter().enumerate() {
            let ordinal = index + 1;
            let executor = Arc::clone(&self.executor);
            let ctx = ctx.clone();
            let span = info_span!("plan", plan = %plan.name, ordinal);
            set.spawn(
                async move { (index, executor.run(&plan, ordinal, &ctx).await) }.instrument(span),
            );
        }

        let mut reports: Vec<Option<PlanReport>> = vec![None; names.len()];
        let mut cancelled = false;

        while let Some(joined) = set.join_next().await {
            let failure = match joined {
                Ok((index, report)) => {
                    let failure = (!report.succeeded()).then(|| {
                        (
                            report.name.clone(),
                            report.error.clone().unwrap_or_default(),
                        )
                    });
                    reports[index] = Some(report);
                    failure
                }
                Err(e) => {
                    error!(error = %e, "plan task aborted");
                    Some((String::new(), e.to_string()))
                }
            };

            if let Some((plan, reason)) = failure
                && !cancelled
            {
                error!(plan = %plan, error = %reason, "plan failed, cancelling remaining plans");
                ctx.cancel();
                cancelled = true;
            }
        }

        // panic으로 끝난 플랜의 teardown은 백그라운드에서 진행 중일 수 있음
        self.executor.wait_for_teardowns().await;

        // 결과 없이 끝난 태스크는 실패로 채움
        let plans: Vec<PlanReport> = reports
            .into_iter()
            .zip(names)
            .enumerate()
            .map(|(index, (report, name))| {
                report.unwrap_or_else(|| {
                    let mut report = PlanReport::new(name, index + 1);
                    report.error = Some("plan task aborted".to_owned());
                    report
                })
            })
            .collect();

        let report = RunReport {
            run_id: self.run_id.clone(),
            job_number: self.job_number.clone(),
            plans,
        };

        info!(
            run_id = %self.run_id,
            success = report.success(),
            failed = report.failed_count(),
            "all plans finished"
        );
        report
    }
}
