use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use shipcheck::cli::{Cli, github_run_id, job_number};
use shipcheck::error::CliError;
use shipcheck::executor::PlanExecutor;
use shipcheck::logging::init_tracing;
use shipcheck::orchestrator::Orchestrator;
use shipcheck::report::{OutputWriter, PlanSetSummary};
use shipcheck::runner::TestRunner;
use shipcheck_core::config::ShipcheckConfig;
use shipcheck_core::plan::PlanSet;
use shipcheck_provisioner::{HelmCli, Provisioner};
use shipcheck_readiness::{HttpProbe, ReadinessPoller};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // 설정 로드 (파일 → 환경변수 → CLI 플래그)
    let mut config = match &cli.config {
        Some(path) => ShipcheckConfig::load(path).await,
        None => ShipcheckConfig::from_env(),
    }
    .map_err(CliError::from)?;

    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }
    config.validate().map_err(CliError::from)?;

    init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;

    let plans = PlanSet::load(&cli.plan_file)
        .await
        .map_err(CliError::from)?;

    let writer = OutputWriter::new(cli.output);

    if cli.validate {
        writer.render(&PlanSetSummary::from(&plans))?;
        return Ok(());
    }

    let job_number = job_number().map_err(CliError::from)?;
    let github_run_id = github_run_id();

    let probe = HttpProbe::new().map_err(|e| CliError::Config(e.to_string()))?;
    let provisioner = Provisioner::new(
        Arc::new(HelmCli::new(config.helm.binary.clone())),
        config.helm.clone(),
    );
    let poller = ReadinessPoller::new(Arc::new(probe), config.readiness.poll_interval());
    let executor = PlanExecutor::new(provisioner, TestRunner::new(poller));
    let orchestrator = Orchestrator::new(executor, config.run.deadline(), job_number.clone());

    tracing::info!(
        run_id = %orchestrator.run_id(),
        job_number = %job_number,
        github_run_id = github_run_id.as_deref().unwrap_or(""),
        plan_file = %cli.plan_file.display(),
        "shipcheck starting"
    );

    let report = orchestrator.run(plans).await;
    writer.render(&report)?;

    if report.success() {
        Ok(())
    } else {
        Err(CliError::PlansFailed {
            failed: report.failed_count(),
            total: report.plans.len(),
        }
        .into())
    }
}
