use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::AdapterError;
use crate::types::{
    EndpointHealthResult, EndpointOutcome, LifecycleState, RoutingHealth, ServiceRuntimeStatus,
};

/// One tick's observation of a service
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub runtime: Result<ServiceRuntimeStatus, AdapterError>,
    /// `None` when the service has no routing group configured
    pub routing: Option<Result<RoutingHealth, AdapterError>>,
    /// `None` when the service has no health URL configured
    pub endpoint: Option<EndpointHealthResult>,
    pub observed_at: DateTime<Utc>,
}

/// Why a sample does not satisfy the stability condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnstableReason {
    NotFound,
    StatusUnavailable(AdapterError),
    NotActive(LifecycleState),
    ReplicasNotConverged { running: u32, desired: u32 },
    NoReplicas,
    NoHealthyTargets { total: u32 },
    RoutingUnavailable(AdapterError),
    EndpointUnhealthy(EndpointOutcome),
    NotSampled,
}

impl fmt::Display for UnstableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("NotFound: service is not registered in the cluster"),
            Self::StatusUnavailable(err) => write!(f, "service status unavailable: {err}"),
            Self::NotActive(state) => write!(f, "lifecycle state is {state}, expected ACTIVE"),
            Self::ReplicasNotConverged { running, desired } => {
                write!(f, "running tasks {running}, expected {desired}")
            }
            Self::NoReplicas => f.write_str("no tasks desired or running, expected at least 1"),
            Self::NoHealthyTargets { total } => {
                write!(f, "healthy targets 0 of {total}, expected at least 1")
            }
            Self::RoutingUnavailable(err) => write!(f, "target health unavailable: {err}"),
            Self::EndpointUnhealthy(EndpointOutcome::UnexpectedStatus(code)) => {
                write!(f, "health endpoint returned HTTP {code}, expected 2xx")
            }
            Self::EndpointUnhealthy(outcome) => write!(f, "health endpoint {outcome}, expected 2xx"),
            Self::NotSampled => f.write_str("interrupted before the first sample"),
        }
    }
}

impl Sample {
    /// Every failed stability condition, in condition order. Empty means stable.
    ///
    /// 1. lifecycle state is `Active`
    /// 2. running == desired, and running > 0
    /// 3. at least one healthy target, when any target is registered
    /// 4. the health endpoint answered 2xx, when a URL is configured
    pub fn unstable_reasons(&self) -> Vec<UnstableReason> {
        let mut reasons = Vec::new();

        match &self.runtime {
            Ok(status) => {
                if status.lifecycle_state != LifecycleState::Active {
                    reasons.push(UnstableReason::NotActive(status.lifecycle_state));
                }
                let (running, desired) = (status.running_replica_count, status.desired_replica_count);
                if running != desired {
                    reasons.push(UnstableReason::ReplicasNotConverged { running, desired });
                } else if running == 0 {
                    reasons.push(UnstableReason::NoReplicas);
                }
            }
            Err(err) if err.is_not_found() => reasons.push(UnstableReason::NotFound),
            Err(err) => reasons.push(UnstableReason::StatusUnavailable(err.clone())),
        }

        match &self.routing {
            Some(Ok(health)) if health.has_targets() && health.healthy_endpoint_count() == 0 => {
                reasons.push(UnstableReason::NoHealthyTargets {
                    total: health.total_endpoint_count(),
                });
            }
            Some(Err(err)) => reasons.push(UnstableReason::RoutingUnavailable(err.clone())),
            _ => {}
        }

        if let Some(result) = &self.endpoint {
            if result.outcome != EndpointOutcome::Healthy {
                reasons.push(UnstableReason::EndpointUnhealthy(result.outcome));
            }
        }

        reasons
    }

    pub fn is_stable(&self) -> bool {
        self.unstable_reasons().is_empty()
    }
}
