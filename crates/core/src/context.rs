//! 실행 컨텍스트 -- 공유 취소 토큰과 실행 전체 데드라인
//!
//! [`RunContext`]는 Orchestrator → Plan Executor → Test Runner → Poller 순으로
//! 전달되는 단일 취소 신호입니다. 모든 대기 지점(폴링 틱, HTTP 응답,
//! 설치 명령 반환)은 이 컨텍스트를 관찰해야 합니다.
//!
//! fail-fast 그룹은 [`RunContext::child`]로 하위 컨텍스트를 만들고,
//! 첫 실패 시 하위 컨텍스트만 취소합니다. 부모 취소는 자식에게 전파됩니다.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 컨텍스트가 종료된 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupt {
    /// 실행 전체 데드라인 도달
    #[error("context deadline exceeded")]
    DeadlineExceeded,
    /// 형제 실패 등으로 명시적 취소
    #[error("context canceled")]
    Cancelled,
}

/// 취소 토큰 + 선택적 데드라인
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RunContext {
    /// 데드라인 없는 루트 컨텍스트를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금부터 `timeout` 후 만료되는 루트 컨텍스트를 생성합니다.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// 같은 데드라인을 공유하는 하위 컨텍스트를 생성합니다.
    ///
    /// 하위 컨텍스트를 취소해도 부모는 영향을 받지 않습니다.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// 이 컨텍스트와 모든 하위 컨텍스트를 취소합니다.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 이미 종료되었다면 그 사유를 반환합니다 (대기하지 않음).
    pub fn interrupted(&self) -> Option<Interrupt> {
        if self.deadline_passed() {
            Some(Interrupt::DeadlineExceeded)
        } else if self.token.is_cancelled() {
            Some(Interrupt::Cancelled)
        } else {
            None
        }
    }

    /// 컨텍스트가 종료될 때까지 대기하고 사유를 반환합니다.
    ///
    /// 데드라인이 이미 지난 뒤 취소된 경우 `DeadlineExceeded`를 보고합니다.
    pub async fn done(&self) -> Interrupt {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => self.cancel_reason(),
                    _ = tokio::time::sleep_until(deadline) => Interrupt::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                Interrupt::Cancelled
            }
        }
    }

    fn cancel_reason(&self) -> Interrupt {
        if self.deadline_passed() {
            Interrupt::DeadlineExceeded
        } else {
            Interrupt::Cancelled
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
