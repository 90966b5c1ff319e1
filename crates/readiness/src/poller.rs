//! 고정 주기 준비 상태 폴러
//!
//! 첫 시도는 시작 직후가 아니라 한 주기 뒤에 일어납니다.
//! 매 tick마다:
//! 1. 시도 횟수를 증가시키고
//! 2. 최대 시도 횟수를 넘었다면 프로브 없이 실패하고
//! 3. 프로브 1회를 실행해 기대 상태 코드와 비교합니다.
//!
//! 전송 에러는 로그만 남기고 다음 tick에 재시도합니다.
//! 대기 중(tick 사이, 응답 대기)에도 컨텍스트 종료를 관찰합니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use shipcheck_core::context::RunContext;
use shipcheck_core::plan::WaitUrlReady;

use crate::error::ReadinessError;
use crate::probe::UrlProbe;

/// 체크 1회 실행 동안의 누적 결과
///
/// 실행 중인 체크 하나가 `&mut`로 독점합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestCounts {
    /// 시도 횟수 (한도 초과로 프로브 없이 끝난 tick 포함)
    pub total: u32,
    /// 기대 상태 코드를 받은 횟수
    pub success: u32,
}

/// `wait-url-ready` 체크 실행기
pub struct ReadinessPoller<U: UrlProbe> {
    probe: Arc<U>,
    interval: Duration,
}

impl<U: UrlProbe> Clone for ReadinessPoller<U> {
    fn clone(&self) -> Self {
        Self {
            probe: Arc::clone(&self.probe),
            interval: self.interval,
        }
    }
}

impl<U: UrlProbe> ReadinessPoller<U> {
    /// 0 주기는 1ms로 올립니다.
    pub fn new(probe: Arc<U>, interval: Duration) -> Self {
        Self {
            probe,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 기대 상태 코드를 한 번 받을 때까지 폴링합니다.
    pub async fn run(
        &self,
        check: &WaitUrlReady,
        counts: &mut RequestCounts,
        ctx: &RunContext,
    ) -> Result<(), ReadinessError> {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                reason = ctx.done() => {
                    warn!(url = %check.url, attempts = counts.total, %reason, "stopped waiting for URL");
                    return Err(ReadinessError::Interrupted(reason));
                }
                _ = ticker.tick() => {}
            }

            counts.total += 1;
            let attempt = counts.total;

            if let Some(limit) = check.retries
                && attempt > limit
            {
                warn!(url = %check.url, limit, "reached max retries");
                return Err(ReadinessError::MaxRetriesExceeded { limit });
            }

            debug!(url = %check.url, attempt, "making request");

            let result = tokio::select! {
                reason = ctx.done() => {
                    warn!(url = %check.url, attempt, %reason, "request abandoned");
                    return Err(ReadinessError::Interrupted(reason));
                }
                result = self.probe.probe(&check.url) => result,
            };

            match result {
                Err(e) => {
                    warn!(url = %check.url, attempt, error = %e, "probe failed, retrying");
                }
                Ok(status) if status == check.expected_status_code => {
                    counts.success += 1;
                    info!(url = %check.url, attempt, status, "successfully fetched URL");
                }
                Ok(status) => {
                    debug!(
                        url = %check.url,
                        attempt,
                        status,
                        expected = check.expected_status_code,
                        "unexpected status code"
                    );
                }
            }

            if counts.success >= 1 {
                return Ok(());
            }
        }
    }
}
