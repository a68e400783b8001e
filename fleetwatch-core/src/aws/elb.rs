use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_elasticloadbalancingv2::types::{TargetHealthDescription, TargetHealthStateEnum};
use aws_sdk_elasticloadbalancingv2::Client;
use tracing::debug;

use super::classify_sdk_error;
use crate::adapters::RoutingSource;
use crate::error::AdapterError;
use crate::types::RoutingHealth;

const ELB_API: &str = "elbv2";

/// Routing source backed by `elasticloadbalancing:DescribeTargetHealth`
#[derive(Debug, Clone)]
pub struct ElbRoutingSource {
    client: Client,
    timeout: Duration,
}

impl ElbRoutingSource {
    pub fn new(config: &SdkConfig, timeout: Duration) -> Self {
        Self {
            client: Client::new(config),
            timeout,
        }
    }

    /// Resolve a target group name to its ARN. `None` when no such group exists.
    async fn resolve_arn(&self, group: &str) -> Result<Option<String>, AdapterError> {
        if group.starts_with("arn:") {
            return Ok(Some(group.to_string()));
        }

        match self.client.describe_target_groups().names(group).send().await {
            Ok(output) => Ok(output
                .target_groups()
                .first()
                .and_then(|tg| tg.target_group_arn())
                .map(str::to_string)),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_target_group_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(classify_sdk_error(ELB_API, &err, self.timeout)),
        }
    }
}

#[async_trait]
impl RoutingSource for ElbRoutingSource {
    async fn routing_health(&self, group: &str) -> Result<RoutingHealth, AdapterError> {
        let Some(arn) = self.resolve_arn(group).await? else {
            debug!(group, "target group not found");
            return Ok(RoutingHealth::empty());
        };

        let result = self
            .client
            .describe_target_health()
            .target_group_arn(&arn)
            .send()
            .await;

        let health = match result {
            Ok(output) => count_targets(output.target_health_descriptions()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_target_group_not_found_exception()) =>
            {
                RoutingHealth::empty()
            }
            Err(err) => return Err(classify_sdk_error(ELB_API, &err, self.timeout)),
        };

        debug!(
            group,
            healthy = health.healthy_endpoint_count(),
            total = health.total_endpoint_count(),
            "target health"
        );
        Ok(health)
    }
}

/// Count registered targets and those the load balancer routes to
pub fn count_targets(descriptions: &[TargetHealthDescription]) -> RoutingHealth {
    let healthy = descriptions
        .iter()
        .filter(|d| {
            d.target_health()
                .and_then(|h| h.state())
                .is_some_and(|state| *state == TargetHealthStateEnum::Healthy)
        })
        .count();

    RoutingHealth::new(saturating_u32(healthy), saturating_u32(descriptions.len()))
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
