//! Three-phase demo: baseline, attack, impact report.
//!
//! Every phase opens its own session and closes it before the next phase
//! starts. A phase that fails is logged and the demo moves on.

use crate::client::attack::{AttackDriver, AttackSummary};
use crate::client::baseline::{BaselineDriver, BaselineSummary};
use crate::client::error::ClientError;
use crate::client::h2::{H2Session, Target};
use crate::client::report::MetricsReport;
use crate::config::ClientConfig;

/// What each phase produced.
#[derive(Debug)]
pub struct DemoOutcome {
    pub baseline: Result<BaselineSummary, ClientError>,
    pub attack: Result<AttackSummary, ClientError>,
    pub report: Result<MetricsReport, ClientError>,
}

pub async fn run_demo(config: &ClientConfig) -> Result<DemoOutcome, ClientError> {
    let target = Target::parse(&config.target)?;
    let phase_pause = config.demo.phase_pause();

    tracing::info!("STEP 1: Normal HTTP/2 requests");
    let baseline = baseline_phase(&target, config).await;
    log_phase_failure("baseline", &baseline);
    tokio::time::sleep(phase_pause).await;

    tracing::info!("STEP 2: Rapid Reset attack");
    let attack = attack_phase(&target, config).await;
    log_phase_failure("attack", &attack);
    tokio::time::sleep(phase_pause).await;

    tracing::info!("STEP 3: Server impact analysis");
    let report = report_phase(&target, config).await;
    log_phase_failure("report", &report);

    Ok(DemoOutcome {
        baseline,
        attack,
        report,
    })
}

pub async fn baseline_phase(
    target: &Target,
    config: &ClientConfig,
) -> Result<BaselineSummary, ClientError> {
    let mut session = H2Session::connect(target, config.timeouts.connect()).await?;
    let summary = BaselineDriver::new(&config.demo, &config.timeouts)
        .run(&mut session)
        .await;
    session.close().await;
    Ok(summary)
}

pub async fn attack_phase(
    target: &Target,
    config: &ClientConfig,
) -> Result<AttackSummary, ClientError> {
    let mut session = H2Session::connect(target, config.timeouts.connect()).await?;
    let summary = AttackDriver::new(&config.attack).run(&mut session).await;
    session.close().await;
    Ok(summary)
}

pub async fn report_phase(
    target: &Target,
    config: &ClientConfig,
) -> Result<MetricsReport, ClientError> {
    let mut session = H2Session::connect(target, config.timeouts.connect()).await?;
    let report = MetricsReport::fetch(&mut session, config.timeouts.request()).await;
    session.close().await;
    report
}

fn log_phase_failure<T>(phase: &'static str, result: &Result<T, ClientError>) {
    if let Err(e) = result {
        if e.is_connection_refused() {
            tracing::error!(phase, error = %e, hint = "server not reachable", "Phase failed");
        } else {
            tracing::error!(phase, error = %e, "Phase failed");
        }
    }
}
