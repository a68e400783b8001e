use chrono::Utc;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::summarizer::{FleetSummarizer, FleetSummary};
use crate::adapters::{EndpointProber, RoutingSource, StatusSource};
use crate::aws::{load_sdk_config, verify_credentials, EcsStatusSource, ElbRoutingSource, InfrastructureSource};
use crate::config::CheckConfig;
use crate::convergence::ConvergencePoller;
use crate::error::CheckError;
use crate::probe::HttpProber;
use crate::report::RunReport;
use crate::types::Result;

/// Run a complete health check against AWS.
///
/// This function:
/// - Loads SDK configuration and resolves credentials
/// - Describes the cluster (fatal if it is missing or access is denied)
/// - Describes the database, cache and load balancer for the report
/// - Polls every service until it converges or its deadline passes
///
/// Returns the report to render; only fatal errors are `Err`.
pub async fn run_fleet_check(config: &CheckConfig, cancel: &CancellationToken) -> Result<RunReport> {
    let started_at = Utc::now();

    let sdk_config = load_sdk_config(&config.region, config.request_timeout).await;
    let status = EcsStatusSource::new(&sdk_config, config.request_timeout);

    let preflight = async {
        verify_credentials(&sdk_config).await?;
        let cluster_summary = status.describe_cluster(&config.cluster).await?;
        let infrastructure = match &config.infrastructure {
            Some(targets) => Some(
                InfrastructureSource::new(&sdk_config, config.request_timeout)
                    .describe(targets)
                    .await,
            ),
            None => None,
        };
        Ok::<_, CheckError>((cluster_summary, infrastructure))
    };
    let (cluster_summary, infrastructure) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(CheckError::Interrupted),
        found = preflight => found?,
    };
    if let Some(summary) = &cluster_summary {
        info!(
            cluster = %summary.name,
            status = %summary.status,
            running_tasks = summary.running_tasks,
            "cluster found"
        );
    }

    let routing = ElbRoutingSource::new(&sdk_config, config.request_timeout);
    let prober = HttpProber::new(Client::new());

    let fleet = check_fleet(config, &status, &routing, &prober, cancel).await;

    Ok(RunReport::new(config, cluster_summary, infrastructure, started_at, fleet))
}

/// Poll every configured service with the given sources
pub async fn check_fleet(
    config: &CheckConfig,
    status: &dyn StatusSource,
    routing: &dyn RoutingSource,
    prober: &dyn EndpointProber,
    cancel: &CancellationToken,
) -> FleetSummary {
    let poller = ConvergencePoller::new(status, routing, prober, config.poll, config.probe_timeout);
    FleetSummarizer::new(poller).run(&config.services, cancel).await
}
