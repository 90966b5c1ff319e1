//! Plan Executor -- 설치, 체크, teardown 순서로 플랜 하나를 실행
//!
//! 1. 설치 사양이 있으면 차트를 설치합니다. 실패하면 체크 없이 바로 실패합니다.
//! 2. 설치 도중 공유 컨텍스트가 종료됐다면 체크 없이 그 사유로 실패합니다.
//! 3. 체크 그룹을 실행합니다.
//! 4. 설치가 성공했다면 판정과 무관하게 teardown을 끝까지 기다립니다.

use tracing::{error, info};

use shipcheck_core::context::RunContext;
use shipcheck_core::error::ShipcheckError;
use shipcheck_core::plan::Plan;
use shipcheck_provisioner::{PackageManager, Provisioner};
use shipcheck_readiness::UrlProbe;

use crate::report::{PlanReport, Status};
use crate::runner::TestRunner;

pub struct PlanExecutor<P: PackageManager, U: UrlProbe> {
    provisioner: Provisioner<P>,
    runner: TestRunner<U>,
}

impl<P: PackageManager, U: UrlProbe> PlanExecutor<P, U> {
    pub fn new(provisioner: Provisioner<P>, runner: TestRunner<U>) -> Self {
        Self {
            provisioner,
            runner,
        }
    }

    /// 비정상 경로로 예약된 teardown이 모두 끝날 때까지 기다립니다.
    pub async fn wait_for_teardowns(&self) {
        self.provisioner.wait_for_teardowns().await;
    }

    /// 플랜을 실행하고 리포트를 반환합니다. `ordinal`은 1부터 시작합니다.
    pub async fn run(&self, plan: &Plan, ordinal: usize, ctx: &RunContext) -> PlanReport {
        let mut report = PlanReport::new(&plan.name, ordinal);

        let guard = match &plan.install.helm {
            Some(helm) => match self.provisioner.install(helm, ordinal).await {
                Ok(guard) => {
                    report.release = Some(guard.release().to_owned());
                    Some(guard)
                }
                Err(e) => {
                    let err = ShipcheckError::from(e);
                    error!(plan = %plan.name, error = %err, "plan failed during install");
                    report.error = Some(err.to_string());
                    return report;
                }
            },
            None => None,
        };

        let result = match ctx.interrupted() {
            Some(reason) => Err(ShipcheckError::Interrupted(reason)),
            None => {
                let outcome = self.runner.run(&plan.tests, ordinal, ctx).await;
                report.checks = outcome.checks;
                outcome.result.map_err(ShipcheckError::from)
            }
        };

        match &result {
            Ok(()) => info!(plan = %plan.name, "plan succeeded"),
            Err(e) => error!(plan = %plan.name, error = %e, "plan failed"),
        }

        if let Some(guard) = guard {
            report.teardown = Some(guard.teardown().await.into());
        }

        match result {
            Ok(()) => report.status = Status::Succeeded,
            Err(e) => report.error = Some(e.to_string()),
        }
        report
    }
}
