use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::stability::Sample;
use crate::adapters::{EndpointProber, RoutingSource, StatusSource};
use crate::config::{PollPolicy, ServiceTarget};

/// How a poll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Convergence {
    Converged,
    TimedOut,
    Cancelled,
}

/// Result of polling one service
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub convergence: Convergence,
    /// Samples that completed
    pub attempts: u32,
    pub elapsed: Duration,
    /// Absent only when cancelled before the first sample completed
    pub last_sample: Option<Sample>,
}

impl PollOutcome {
    pub fn is_stable(&self) -> bool {
        self.convergence == Convergence::Converged
    }
}

#[derive(Debug)]
enum PollState {
    /// `attempts` counts completed samples
    Polling { attempts: u32, last: Option<Sample> },
    Converged { attempts: u32, sample: Sample },
    TimedOut { attempts: u32, sample: Sample },
    Cancelled { attempts: u32, last: Option<Sample> },
}

/// Samples one service on a fixed interval until it is stable or the
/// deadline passes
pub struct ConvergencePoller<'a> {
    status: &'a dyn StatusSource,
    routing: &'a dyn RoutingSource,
    prober: &'a dyn EndpointProber,
    policy: PollPolicy,
    probe_timeout: Duration,
}

impl<'a> ConvergencePoller<'a> {
    pub fn new(
        status: &'a dyn StatusSource,
        routing: &'a dyn RoutingSource,
        prober: &'a dyn EndpointProber,
        policy: PollPolicy,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            status,
            routing,
            prober,
            policy,
            probe_timeout,
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Poll `target` until it converges, the deadline passes, or `cancel` fires.
    ///
    /// Returns as soon as one sample is stable. A timeout is reported only
    /// once the full `max_wait` has elapsed, with the last sample taken at
    /// the deadline.
    pub async fn poll(&self, target: &ServiceTarget, cancel: &CancellationToken) -> PollOutcome {
        let started = Instant::now();
        let deadline = started + self.policy.max_wait;
        let mut state = PollState::Polling { attempts: 0, last: None };

        let (convergence, attempts, last_sample) = loop {
            state = match state {
                PollState::Polling { attempts, last } => {
                    self.tick(target, attempts, last, deadline, cancel).await
                }
                PollState::Converged { attempts, sample } => {
                    break (Convergence::Converged, attempts, Some(sample))
                }
                PollState::TimedOut { attempts, sample } => {
                    break (Convergence::TimedOut, attempts, Some(sample))
                }
                PollState::Cancelled { attempts, last } => break (Convergence::Cancelled, attempts, last),
            };
        };

        let elapsed = started.elapsed();
        match convergence {
            Convergence::Converged => {
                info!(service = %target.identity, attempts, ?elapsed, "service converged")
            }
            Convergence::TimedOut => {
                warn!(service = %target.identity, attempts, ?elapsed, "service did not stabilize in time")
            }
            Convergence::Cancelled => {
                warn!(service = %target.identity, attempts, "polling cancelled")
            }
        }

        PollOutcome {
            convergence,
            attempts,
            elapsed,
            last_sample,
        }
    }

    async fn tick(
        &self,
        target: &ServiceTarget,
        attempts: u32,
        last: Option<Sample>,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> PollState {
        let sample = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollState::Cancelled { attempts, last },
            sample = self.sample(target) => sample,
        };
        let attempts = attempts + 1;

        let reasons = sample.unstable_reasons();
        if reasons.is_empty() {
            return PollState::Converged { attempts, sample };
        }
        debug!(
            service = %target.identity,
            attempt = attempts,
            reasons = ?reasons.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "not stable yet"
        );

        let now = Instant::now();
        if now >= deadline {
            return PollState::TimedOut { attempts, sample };
        }

        let pause = self.policy.interval.min(deadline - now);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => PollState::Cancelled { attempts, last: Some(sample) },
            _ = sleep(pause) => PollState::Polling { attempts, last: Some(sample) },
        }
    }

    /// Query all three sources for `target` concurrently.
    ///
    /// Sources the service has no configuration for are skipped.
    pub async fn sample(&self, target: &ServiceTarget) -> Sample {
        let runtime = self.status.runtime_status(target);
        let routing = async {
            match &target.target_group {
                Some(group) => Some(self.routing.routing_health(group).await),
                None => None,
            }
        };
        let endpoint = async {
            match &target.health_url {
                Some(url) => Some(self.prober.probe(url, self.probe_timeout).await),
                None => None,
            }
        };

        let (runtime, routing, endpoint) = tokio::join!(runtime, routing, endpoint);

        if let Err(err) = &runtime {
            if !err.is_not_found() {
                warn!(service = %target.identity, error = %err, "status query failed");
            }
        }
        if let Some(Err(err)) = &routing {
            warn!(service = %target.identity, error = %err, "target health query failed");
        }

        Sample {
            runtime,
            routing,
            endpoint,
            observed_at: Utc::now(),
        }
    }
}
