//! Run report payloads and text vs JSON rendering
//!
//! All report output flows through [`OutputWriter`] which handles format switching.
//! Reports go to stdout; logs go to stderr.

use std::io::Write;

use serde::Serialize;

use shipcheck_core::plan::{PlanSet, TestSpec, WaitUrlReady};
use shipcheck_provisioner::TeardownOutcome;
use shipcheck_readiness::RequestCounts;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes report payloads to stdout in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to an arbitrary writer.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(w)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every report payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// 성공/실패 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Succeeded,
    Failed,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Succeeded => "ok",
            Self::Failed => "FAIL",
        }
    }
}

/// 체크 1개의 결과
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: Status,
    pub attempts: u32,
    pub successes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckReport {
    pub fn wait_url_ready(check: &WaitUrlReady, counts: RequestCounts, error: Option<String>) -> Self {
        Self {
            kind: "wait-url-ready",
            url: Some(check.url.clone()),
            status: if error.is_none() {
                Status::Succeeded
            } else {
                Status::Failed
            },
            attempts: counts.total,
            successes: counts.success,
            error,
        }
    }

    pub fn noop() -> Self {
        Self {
            kind: "noop",
            url: None,
            status: Status::Succeeded,
            attempts: 0,
            successes: 0,
            error: None,
        }
    }

    /// 태스크가 결과 없이 끝난 체크 (panic 등)
    pub fn aborted(spec: &TestSpec, reason: String) -> Self {
        let url = match spec {
            TestSpec::WaitUrlReady(check) => Some(check.url.clone()),
            TestSpec::Noop => None,
        };
        Self {
            kind: spec.kind(),
            url,
            status: Status::Failed,
            attempts: 0,
            successes: 0,
            error: Some(reason),
        }
    }
}

/// teardown 결과 (판정에 영향 없음)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum TeardownReport {
    Uninstalled,
    Failed { error: String },
}

impl From<TeardownOutcome> for TeardownReport {
    fn from(outcome: TeardownOutcome) -> Self {
        match outcome {
            TeardownOutcome::Uninstalled => Self::Uninstalled,
            TeardownOutcome::Failed(error) => Self::Failed { error },
        }
    }
}

/// 플랜 1개의 결과
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub name: String,
    pub ordinal: usize,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    pub checks: Vec<CheckReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown: Option<TeardownReport>,
}

impl PlanReport {
    /// 아직 판정되지 않은 빈 리포트 (실패로 시작)
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            ordinal,
            status: Status::Failed,
            release: None,
            checks: Vec::new(),
            error: None,
            teardown: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == Status::Succeeded
    }
}

/// 실행 전체 결과
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub job_number: String,
    pub plans: Vec<PlanReport>,
}

impl RunReport {
    /// 모든 플랜이 성공했는지 여부 (플랜이 없으면 성공)
    pub fn success(&self) -> bool {
        self.plans.iter().all(PlanReport::succeeded)
    }

    pub fn failed_count(&self) -> usize {
        self.plans.iter().filter(|p| !p.succeeded()).count()
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "run {} (job {})", self.run_id, self.job_number)?;
        for plan in &self.plans {
            write!(w, "  [{:<4}] #{} {}", plan.status.label(), plan.ordinal, plan.name)?;
            if let Some(release) = &plan.release {
                write!(w, "  release={release}")?;
            }
            match &plan.teardown {
                Some(TeardownReport::Uninstalled) => write!(w, "  teardown=uninstalled")?,
                Some(TeardownReport::Failed { error }) => write!(w, "  teardown=failed ({error})")?,
                None => {}
            }
            writeln!(w)?;
            if let Some(error) = &plan.error {
                writeln!(w, "         error: {error}")?;
            }
            for check in &plan.checks {
                write!(
                    w,
                    "         - [{:<4}] {}",
                    check.status.label(),
                    check.kind
                )?;
                if let Some(url) = &check.url {
                    write!(
                        w,
                        " {url} attempts={} successes={}",
                        check.attempts, check.successes
                    )?;
                }
                if let Some(error) = &check.error {
                    write!(w, " ({error})")?;
                }
                writeln!(w)?;
            }
        }
        writeln!(
            w,
            "{} plans: {} succeeded, {} failed",
            self.plans.len(),
            self.plans.len() - self.failed_count(),
            self.failed_count()
        )
    }
}

/// `--validate` 출력
#[derive(Debug, Clone, Serialize)]
pub struct PlanSetSummary {
    pub plans: Vec<PlanSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
    pub checks: usize,
}

impl From<&PlanSet> for PlanSetSummary {
    fn from(plan_set: &PlanSet) -> Self {
        Self {
            plans: plan_set
                .plans
                .iter()
                .map(|plan| PlanSummary {
                    name: plan.name.clone(),
                    chart: plan.install.helm.as_ref().map(|h| h.chart.clone()),
                    checks: plan.tests.len(),
                })
                .collect(),
        }
    }
}

impl Render for PlanSetSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "plan document OK: {} plans", self.plans.len())?;
        for (index, plan) in self.plans.iter().enumerate() {
            write!(w, "  #{} {} ({} checks", index + 1, plan.name, plan.checks)?;
            if let Some(chart) = &plan.chart {
                write!(w, ", chart {chart}")?;
            }
            writeln!(w, ")")?;
        }
        Ok(())
    }
}
