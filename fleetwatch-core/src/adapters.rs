//! The three health sources sampled on every convergence tick.
//!
//! Production implementations live in [`crate::aws`] and [`crate::probe`];
//! tests substitute in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::config::ServiceTarget;
use crate::error::AdapterError;
use crate::types::{EndpointHealthResult, RoutingHealth, ServiceRuntimeStatus};

/// Desired/running replica counts from the fleet-management API.
///
/// Implementations apply their own short request timeout and never retry.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn runtime_status(&self, target: &ServiceTarget) -> Result<ServiceRuntimeStatus, AdapterError>;
}

/// Healthy/total endpoint counts of a load-balancer routing group.
///
/// A group that does not exist yields [`RoutingHealth::empty`], not an error.
#[async_trait]
pub trait RoutingSource: Send + Sync {
    async fn routing_health(&self, group: &str) -> Result<RoutingHealth, AdapterError>;
}

/// Single liveness request against a service's health URL.
///
/// Negative outcomes are values: this never fails.
#[async_trait]
pub trait EndpointProber: Send + Sync {
    async fn probe(&self, url: &Url, timeout: Duration) -> EndpointHealthResult;
}
