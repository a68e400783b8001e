use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CheckError;

// Re-export Result type for convenience
pub type Result<T> = std::result::Result<T, CheckError>;

/// One deployable unit within a cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ServiceIdentity {
    pub name: String,
    pub cluster: String,
}

impl ServiceIdentity {
    pub fn new(name: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cluster: cluster.into(),
        }
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.name)
    }
}

/// Lifecycle state reported by the fleet-management API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Provisioning,
    Active,
    Draining,
    Unknown,
}

impl LifecycleState {
    /// Map an ECS service `status` string.
    pub fn from_ecs_status(status: &str) -> Self {
        match status {
            "ACTIVE" => Self::Active,
            "DRAINING" | "INACTIVE" => Self::Draining,
            "PROVISIONING" | "PENDING" => Self::Provisioning,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Provisioning => "PROVISIONING",
            Self::Active => "ACTIVE",
            Self::Draining => "DRAINING",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Newest deployment of a service, reported for operators only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentInfo {
    pub rollout_state: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Snapshot of a service's replica counts.
///
/// `running_replica_count` may exceed `desired_replica_count` while a rolling
/// deployment overlaps old and new tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRuntimeStatus {
    pub desired_replica_count: u32,
    pub running_replica_count: u32,
    pub pending_replica_count: u32,
    pub lifecycle_state: LifecycleState,
    pub deployment: Option<DeploymentInfo>,
}

impl ServiceRuntimeStatus {
    pub fn new(desired: u32, running: u32, lifecycle_state: LifecycleState) -> Self {
        Self {
            desired_replica_count: desired,
            running_replica_count: running,
            pending_replica_count: 0,
            lifecycle_state,
            deployment: None,
        }
    }
}

/// Classified outcome of one HTTP health probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "code")]
pub enum EndpointOutcome {
    Healthy,
    Unreachable,
    UnexpectedStatus(u16),
}

impl fmt::Display for EndpointOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => f.write_str("healthy"),
            Self::Unreachable => f.write_str("unreachable"),
            Self::UnexpectedStatus(code) => write!(f, "HTTP {code}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndpointHealthResult {
    pub outcome: EndpointOutcome,
    #[serde(with = "duration_millis")]
    pub latency: Duration,
}

/// Routable endpoints of a load-balancer target group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoutingHealth {
    healthy_endpoint_count: u32,
    total_endpoint_count: u32,
}

impl RoutingHealth {
    /// Healthy counts above the total are clamped to the total.
    pub fn new(healthy: u32, total: u32) -> Self {
        Self {
            healthy_endpoint_count: healthy.min(total),
            total_endpoint_count: total,
        }
    }

    /// A group that does not exist or has nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn healthy_endpoint_count(&self) -> u32 {
        self.healthy_endpoint_count
    }

    pub fn total_endpoint_count(&self) -> u32 {
        self.total_endpoint_count
    }

    pub fn unhealthy_endpoint_count(&self) -> u32 {
        self.total_endpoint_count - self.healthy_endpoint_count
    }

    pub fn has_targets(&self) -> bool {
        self.total_endpoint_count > 0
    }
}

/// Cluster overview gathered before polling starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    pub name: String,
    pub status: String,
    pub running_tasks: u32,
    pub pending_tasks: u32,
    pub active_services: u32,
}

/// Status of a supporting resource as its API reported it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum ResourceStatus {
    /// Raw status string, e.g. `available` or `active`
    Reported(String),
    NotFound,
    Error(String),
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reported(status) => f.write_str(status),
            Self::NotFound => f.write_str("not found"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub id: String,
    pub status: ResourceStatus,
}

impl ResourceSummary {
    pub fn new(id: impl Into<String>, status: ResourceStatus) -> Self {
        Self { id: id.into(), status }
    }
}

/// Database, cache and load balancer backing the fleet.
///
/// Shown in the report only; never part of a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfrastructureSummary {
    pub database: ResourceSummary,
    pub cache: ResourceSummary,
    pub load_balancer: ResourceSummary,
}

pub(crate) mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Timed {
        #[serde(with = "duration_millis")]
        latency: Duration,
    }

    #[test]
    fn ecs_status_strings_map_to_lifecycle() {
        assert_eq!(LifecycleState::from_ecs_status("ACTIVE"), LifecycleState::Active);
        assert_eq!(LifecycleState::from_ecs_status("DRAINING"), LifecycleState::Draining);
        assert_eq!(LifecycleState::from_ecs_status("INACTIVE"), LifecycleState::Draining);
        assert_eq!(LifecycleState::from_ecs_status("PROVISIONING"), LifecycleState::Provisioning);
        assert_eq!(LifecycleState::from_ecs_status("active"), LifecycleState::Unknown);
        assert_eq!(LifecycleState::from_ecs_status(""), LifecycleState::Unknown);
    }

    #[test]
    fn routing_health_never_reports_more_healthy_than_total() {
        let health = RoutingHealth::new(5, 3);
        assert_eq!(health.healthy_endpoint_count(), 3);
        assert_eq!(health.total_endpoint_count(), 3);
        assert_eq!(health.unhealthy_endpoint_count(), 0);

        let health = RoutingHealth::new(1, 4);
        assert_eq!(health.unhealthy_endpoint_count(), 3);
        assert!(health.has_targets());
        assert!(!RoutingHealth::empty().has_targets());
    }

    #[test]
    fn millis_saturate_instead_of_wrapping() {
        let value = serde_json::to_value(Timed { latency: Duration::MAX }).unwrap();
        assert_eq!(value["latency"], u64::MAX);

        let value = serde_json::to_value(Timed { latency: Duration::from_millis(1500) }).unwrap();
        assert_eq!(value["latency"], 1500);
    }
}
