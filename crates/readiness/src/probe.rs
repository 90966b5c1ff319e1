//! HTTP 프로브 추상화
//!
//! [`UrlProbe`]는 URL에 GET 요청 1회를 보내고 상태 코드를 돌려줍니다.
//! [`HttpProbe`]는 리다이렉트를 따라가지 않으므로 3xx 상태 코드가 그대로 관찰됩니다.
//! 요청별 타임아웃은 두지 않으며, 응답 대기는 호출 측이 컨텍스트로 중단합니다.

use std::future::Future;

use crate::error::ReadinessError;

/// URL 프로브 trait
pub trait UrlProbe: Send + Sync + 'static {
    /// GET 요청 1회를 보내고 응답 상태 코드를 반환합니다.
    ///
    /// 응답을 받지 못한 경우(연결 실패, 요청 생성 실패 등)에만 에러를 반환합니다.
    fn probe(&self, url: &str) -> impl Future<Output = Result<u16, ReadinessError>> + Send;
}

/// reqwest 기반 프로덕션 구현
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, ReadinessError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ReadinessError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl UrlProbe for HttpProbe {
    async fn probe(&self, url: &str) -> Result<u16, ReadinessError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_builder() {
                ReadinessError::InvalidRequest {
                    url: url.to_owned(),
                    reason: e.to_string(),
                }
            } else {
                ReadinessError::Transport {
                    url: url.to_owned(),
                    reason: e.to_string(),
                }
            }
        })?;
        Ok(response.status().as_u16())
    }
}

/// 테스트용 스크립트 프로브
///
/// 스크립트에 적힌 응답을 순서대로 돌려주고, 소진되면 `fallback`을 반복합니다.
#[cfg(test)]
pub struct ScriptedProbe {
    script: std::sync::Mutex<std::collections::VecDeque<Option<u16>>>,
    fallback: Option<u16>,
    calls: std::sync::atomic::AtomicU32,
}

#[cfg(test)]
impl ScriptedProbe {
    /// `None`은 전송 실패를 뜻합니다.
    pub fn new(script: Vec<Option<u16>>, fallback: Option<u16>) -> Self {
        Self {
            script: std::sync::Mutex::new(script.into()),
            fallback,
            calls: std::sync::atomic::AtomicU32::new(0),
        }
    }

    pub fn always(status: u16) -> Self {
        Self::new(Vec::new(), Some(status))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl UrlProbe for ScriptedProbe {
    async fn probe(&self, url: &str) -> Result<u16, ReadinessError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        next.ok_or_else(|| ReadinessError::Transport {
            url: url.to_owned(),
            reason: "connection refused".to_owned(),
        })
    }
}
