//! 로그 초기화
//!
//! stdout은 실행 리포트 전용입니다 (`--output json`을 파이프로 받을 수 있도록).
//! 모든 tracing 로그는 stderr로 나갑니다.
//!
//! 레벨은 `RUST_LOG`가 있으면 그것을, 없으면 `[general] log_level`을 따릅니다.

use std::str::FromStr;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use shipcheck_core::config::GeneralConfig;

/// stderr 로그 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 한 줄에 JSON 객체 하나 (CI 로그 수집용, 기본값)
    Json,
    /// 여러 줄로 풀어 쓴 사람용 출력
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(anyhow::anyhow!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            )),
        }
    }
}

/// 전역 subscriber를 설치합니다. 프로세스당 한 번만 호출합니다.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let format: LogFormat = config.log_format.parse()?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(stderr_layer(format))
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install {format:?} log subscriber: {e}"))
}

fn stderr_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let base = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    match format {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
    }
}
