use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecs::operation::describe_clusters::DescribeClustersOutput;
use aws_sdk_ecs::operation::describe_services::DescribeServicesOutput;
use aws_sdk_ecs::types::{Deployment, Failure, Service};
use aws_sdk_ecs::Client;
use tracing::{debug, warn};

use super::classify_sdk_error;
use crate::adapters::StatusSource;
use crate::config::ServiceTarget;
use crate::error::{AdapterError, CheckError};
use crate::types::{ClusterSummary, DeploymentInfo, LifecycleState, ServiceRuntimeStatus};
use crate::utils::from_epoch;

const ECS_API: &str = "ecs";

/// ECS failure reason for services and clusters that do not exist
const MISSING_REASON: &str = "MISSING";

/// Status source backed by `ecs:DescribeServices`
#[derive(Debug, Clone)]
pub struct EcsStatusSource {
    client: Client,
    timeout: Duration,
}

impl EcsStatusSource {
    pub fn new(config: &SdkConfig, timeout: Duration) -> Self {
        Self {
            client: Client::new(config),
            timeout,
        }
    }

    /// Describe the cluster before polling.
    ///
    /// Rejected credentials and a missing cluster are fatal. Any other API
    /// failure only costs the report its cluster header.
    pub async fn describe_cluster(&self, cluster: &str) -> Result<Option<ClusterSummary>, CheckError> {
        let result = self.client.describe_clusters().clusters(cluster).send().await;

        let output = match result {
            Ok(output) => output,
            Err(err) => match classify_sdk_error(ECS_API, &err, self.timeout) {
                AdapterError::Unauthorized(message) => {
                    return Err(CheckError::Authentication { api: ECS_API, message })
                }
                other => {
                    warn!(cluster, error = %other, "cluster preflight failed, continuing without summary");
                    return Ok(None);
                }
            },
        };

        decode_cluster(cluster, &output).map(Some)
    }
}

#[async_trait]
impl StatusSource for EcsStatusSource {
    async fn runtime_status(&self, target: &ServiceTarget) -> Result<ServiceRuntimeStatus, AdapterError> {
        let output = self
            .client
            .describe_services()
            .cluster(&target.identity.cluster)
            .services(&target.ecs_service)
            .send()
            .await
            .map_err(|err| classify_sdk_error(ECS_API, &err, self.timeout))?;

        let status = decode_service(&target.ecs_service, &output)?;
        debug!(
            service = %target.identity,
            desired = status.desired_replica_count,
            running = status.running_replica_count,
            state = %status.lifecycle_state,
            "ecs status"
        );
        Ok(status)
    }
}

/// Turn a `DescribeServices` response for one service into a runtime status
pub fn decode_service(
    ecs_service: &str,
    output: &DescribeServicesOutput,
) -> Result<ServiceRuntimeStatus, AdapterError> {
    let Some(service) = find_service(ecs_service, output.services()) else {
        return Err(missing_or_failed(ecs_service, output.failures()));
    };

    let status = service
        .status()
        .ok_or_else(|| AdapterError::MalformedResponse(format!("service {ecs_service} has no status")))?;

    Ok(ServiceRuntimeStatus {
        desired_replica_count: count(ecs_service, "desiredCount", service.desired_count())?,
        running_replica_count: count(ecs_service, "runningCount", service.running_count())?,
        pending_replica_count: count(ecs_service, "pendingCount", service.pending_count())?,
        lifecycle_state: LifecycleState::from_ecs_status(status),
        deployment: newest_deployment(service.deployments()),
    })
}

/// Turn a `DescribeClusters` response into a cluster summary
pub fn decode_cluster(cluster: &str, output: &DescribeClustersOutput) -> Result<ClusterSummary, CheckError> {
    let found = output
        .clusters()
        .iter()
        .find(|c| c.status() != Some("INACTIVE"));

    let Some(found) = found else {
        return Err(CheckError::ClusterNotFound(cluster.to_string()));
    };

    Ok(ClusterSummary {
        name: found.cluster_name().unwrap_or(cluster).to_string(),
        status: found.status().unwrap_or("UNKNOWN").to_string(),
        running_tasks: u32::try_from(found.running_tasks_count()).unwrap_or(0),
        pending_tasks: u32::try_from(found.pending_tasks_count()).unwrap_or(0),
        active_services: u32::try_from(found.active_services_count()).unwrap_or(0),
    })
}

fn find_service<'a>(ecs_service: &str, services: &'a [Service]) -> Option<&'a Service> {
    services
        .iter()
        .find(|s| s.service_name() == Some(ecs_service) || s.service_arn() == Some(ecs_service))
        .or_else(|| services.first())
}

fn missing_or_failed(ecs_service: &str, failures: &[Failure]) -> AdapterError {
    match failures.first().and_then(|f| f.reason()) {
        None | Some(MISSING_REASON) => AdapterError::NotFound(ecs_service.to_string()),
        Some(reason) => AdapterError::Unavailable(format!("{ECS_API}: {ecs_service}: {reason}")),
    }
}

fn count(ecs_service: &str, field: &str, value: i32) -> Result<u32, AdapterError> {
    u32::try_from(value).map_err(|_| {
        AdapterError::MalformedResponse(format!("service {ecs_service} reports {field} = {value}"))
    })
}

fn newest_deployment(deployments: &[Deployment]) -> Option<DeploymentInfo> {
    let deployment = deployments
        .iter()
        .find(|d| d.status() == Some("PRIMARY"))
        .or_else(|| deployments.first())?;

    Some(DeploymentInfo {
        rollout_state: deployment.rollout_state().map(|s| s.as_str().to_string()),
        created_at: deployment
            .created_at()
            .and_then(|at| from_epoch(at.secs(), at.subsec_nanos())),
    })
}
