use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::verdict::{FleetVerdict, ServiceVerdict};
use crate::config::ServiceTarget;
use crate::convergence::ConvergencePoller;

/// Verdicts for every service plus their reduction
#[derive(Debug, Clone)]
pub struct FleetSummary {
    /// One entry per service, in configuration order
    pub services: Vec<ServiceVerdict>,
    pub verdict: FleetVerdict,
}

/// Runs one poller per service concurrently and reduces the results
pub struct FleetSummarizer<'a> {
    poller: ConvergencePoller<'a>,
}

impl<'a> FleetSummarizer<'a> {
    pub fn new(poller: ConvergencePoller<'a>) -> Self {
        Self { poller }
    }

    pub async fn run(&self, services: &[ServiceTarget], cancel: &CancellationToken) -> FleetSummary {
        info!(
            services = services.len(),
            interval = ?self.poller.policy().interval,
            max_wait = ?self.poller.policy().max_wait,
            "waiting for fleet to converge"
        );

        let polls = services.iter().map(|target| async move {
            let outcome = self.poller.poll(target, cancel).await;
            ServiceVerdict::from_outcome(target.identity.clone(), outcome)
        });
        let verdicts = join_all(polls).await;

        let verdict = FleetVerdict::from_verdicts(&verdicts);
        info!(
            healthy = verdict.healthy_count,
            total = verdict.total_count,
            overall = ?verdict.overall,
            "fleet check finished"
        );

        FleetSummary {
            services: verdicts,
            verdict,
        }
    }
}
