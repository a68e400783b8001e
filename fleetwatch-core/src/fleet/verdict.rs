use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::convergence::{Convergence, PollOutcome, UnstableReason};
use crate::types::{EndpointHealthResult, RoutingHealth, ServiceIdentity, ServiceRuntimeStatus};

/// Final judgement for one service
#[derive(Debug, Clone)]
pub struct ServiceVerdict {
    pub identity: ServiceIdentity,
    pub is_stable: bool,
    pub convergence: Convergence,
    pub attempts: u32,
    pub elapsed: Duration,
    pub runtime_status: Option<ServiceRuntimeStatus>,
    pub routing_health: Option<RoutingHealth>,
    pub endpoint_result: Option<EndpointHealthResult>,
    pub reasons: Vec<UnstableReason>,
}

impl ServiceVerdict {
    pub fn from_outcome(identity: ServiceIdentity, outcome: PollOutcome) -> Self {
        let is_stable = outcome.is_stable();
        let (runtime_status, routing_health, endpoint_result, reasons) = match outcome.last_sample {
            Some(sample) => {
                let reasons = if is_stable {
                    Vec::new()
                } else {
                    sample.unstable_reasons()
                };
                (
                    sample.runtime.ok(),
                    sample.routing.and_then(Result::ok),
                    sample.endpoint,
                    reasons,
                )
            }
            None => (None, None, None, vec![UnstableReason::NotSampled]),
        };

        Self {
            identity,
            is_stable,
            convergence: outcome.convergence,
            attempts: outcome.attempts,
            elapsed: outcome.elapsed,
            runtime_status,
            routing_health,
            endpoint_result,
            reasons,
        }
    }
}

/// Overall fleet state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverallHealth {
    AllHealthy,
    PartiallyHealthy,
    AllUnhealthy,
}

impl OverallHealth {
    /// Process exit code: 0 all healthy, 1 partially healthy, 2 none healthy
    pub fn exit_code(self) -> i32 {
        match self {
            Self::AllHealthy => 0,
            Self::PartiallyHealthy => 1,
            Self::AllUnhealthy => 2,
        }
    }
}

impl fmt::Display for OverallHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AllHealthy => "all services healthy",
            Self::PartiallyHealthy => "fleet partially healthy",
            Self::AllUnhealthy => "no service healthy",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetVerdict {
    pub healthy_count: usize,
    pub total_count: usize,
    pub overall: OverallHealth,
}

impl FleetVerdict {
    /// Reduce per-service stability flags. Only the counts matter, so the
    /// order of the input never changes the result. An empty fleet has
    /// nothing verified healthy and reduces to `AllUnhealthy`.
    pub fn reduce<I>(stable: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let (healthy_count, total_count) = stable
            .into_iter()
            .fold((0, 0), |(healthy, total), is_stable| (healthy + usize::from(is_stable), total + 1));

        let overall = if total_count > 0 && healthy_count == total_count {
            OverallHealth::AllHealthy
        } else if healthy_count == 0 {
            OverallHealth::AllUnhealthy
        } else {
            OverallHealth::PartiallyHealthy
        };

        Self {
            healthy_count,
            total_count,
            overall,
        }
    }

    pub fn from_verdicts(verdicts: &[ServiceVerdict]) -> Self {
        Self::reduce(verdicts.iter().map(|v| v.is_stable))
    }

    pub fn exit_code(&self) -> i32 {
        self.overall.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_covers_all_three_verdicts() {
        assert_eq!(FleetVerdict::reduce([true, true, true]).overall, OverallHealth::AllHealthy);
        assert_eq!(FleetVerdict::reduce([true, false, true]).overall, OverallHealth::PartiallyHealthy);
        assert_eq!(FleetVerdict::reduce([false, false]).overall, OverallHealth::AllUnhealthy);
        assert_eq!(FleetVerdict::reduce(std::iter::empty()).overall, OverallHealth::AllUnhealthy);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(OverallHealth::AllHealthy.exit_code(), 0);
        assert_eq!(OverallHealth::PartiallyHealthy.exit_code(), 1);
        assert_eq!(OverallHealth::AllUnhealthy.exit_code(), 2);
    }

    #[test]
    fn reduction_ignores_order() {
        let flags = [true, false, true, true, false];
        let expected = FleetVerdict::reduce(flags);
        assert_eq!(expected.healthy_count, 3);
        assert_eq!(expected.total_count, 5);

        // every rotation and the reversal of the input
        for shift in 0..flags.len() {
            let mut rotated = flags;
            rotated.rotate_left(shift);
            assert_eq!(FleetVerdict::reduce(rotated), expected);
            rotated.reverse();
            assert_eq!(FleetVerdict::reduce(rotated), expected);
        }
    }

    #[test]
    fn cancelled_before_sampling_has_a_reason() {
        let outcome = PollOutcome {
            convergence: Convergence::Cancelled,
            attempts: 0,
            elapsed: Duration::ZERO,
            last_sample: None,
        };
        let verdict = ServiceVerdict::from_outcome(ServiceIdentity::new("api-gateway", "shop-cluster"), outcome);
        assert!(!verdict.is_stable);
        assert_eq!(verdict.reasons, vec![UnstableReason::NotSampled]);
        assert_eq!(verdict.attempts, 0);
    }
}
