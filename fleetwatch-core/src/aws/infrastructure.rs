use std::time::Duration;

use aws_config::SdkConfig;
use aws_sdk_elasticache::operation::describe_cache_clusters::DescribeCacheClustersOutput;
use aws_sdk_elasticloadbalancingv2::types::LoadBalancer;
use aws_sdk_rds::operation::describe_db_instances::DescribeDbInstancesOutput;
use tracing::{debug, warn};

use super::classify_sdk_error;
use crate::config::InfrastructureTargets;
use crate::types::{InfrastructureSummary, ResourceStatus, ResourceSummary};

/// Describes the database, cache and load balancer for the report header.
///
/// Every failure becomes a [`ResourceStatus`]; nothing here aborts a run.
#[derive(Debug, Clone)]
pub struct InfrastructureSource {
    rds: aws_sdk_rds::Client,
    elasticache: aws_sdk_elasticache::Client,
    elb: aws_sdk_elasticloadbalancingv2::Client,
    timeout: Duration,
}

impl InfrastructureSource {
    pub fn new(config: &SdkConfig, timeout: Duration) -> Self {
        Self {
            rds: aws_sdk_rds::Client::new(config),
            elasticache: aws_sdk_elasticache::Client::new(config),
            elb: aws_sdk_elasticloadbalancingv2::Client::new(config),
            timeout,
        }
    }

    pub async fn describe(&self, targets: &InfrastructureTargets) -> InfrastructureSummary {
        let (database, cache, load_balancer) = tokio::join!(
            self.database(&targets.database_id),
            self.cache(&targets.cache_cluster_id),
            self.load_balancer(&targets.load_balancer_prefix),
        );

        debug!(
            database = %database.status,
            cache = %cache.status,
            load_balancer = %load_balancer.status,
            "infrastructure described"
        );
        InfrastructureSummary {
            database,
            cache,
            load_balancer,
        }
    }

    async fn database(&self, id: &str) -> ResourceSummary {
        match self.rds.describe_db_instances().db_instance_identifier(id).send().await {
            Ok(output) => decode_db_instance(id, &output),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_db_instance_not_found_fault()) =>
            {
                ResourceSummary::new(id, ResourceStatus::NotFound)
            }
            Err(err) => {
                let err = classify_sdk_error("rds", &err, self.timeout);
                warn!(database = id, error = %err, "database status unavailable");
                ResourceSummary::new(id, ResourceStatus::Error(err.to_string()))
            }
        }
    }

    async fn cache(&self, id: &str) -> ResourceSummary {
        match self
            .elasticache
            .describe_cache_clusters()
            .cache_cluster_id(id)
            .send()
            .await
        {
            Ok(output) => decode_cache_cluster(id, &output),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_cache_cluster_not_found_fault()) =>
            {
                ResourceSummary::new(id, ResourceStatus::NotFound)
            }
            Err(err) => {
                let err = classify_sdk_error("elasticache", &err, self.timeout);
                warn!(cache = id, error = %err, "cache status unavailable");
                ResourceSummary::new(id, ResourceStatus::Error(err.to_string()))
            }
        }
    }

    async fn load_balancer(&self, prefix: &str) -> ResourceSummary {
        match self.elb.describe_load_balancers().send().await {
            Ok(output) => find_load_balancer(prefix, output.load_balancers()),
            Err(err) => {
                let err = classify_sdk_error("elbv2", &err, self.timeout);
                warn!(prefix, error = %err, "load balancer status unavailable");
                ResourceSummary::new(prefix, ResourceStatus::Error(err.to_string()))
            }
        }
    }
}

pub fn decode_db_instance(id: &str, output: &DescribeDbInstancesOutput) -> ResourceSummary {
    let status = match output.db_instances().first() {
        Some(instance) => reported(instance.db_instance_status()),
        None => ResourceStatus::NotFound,
    };
    ResourceSummary::new(id, status)
}

pub fn decode_cache_cluster(id: &str, output: &DescribeCacheClustersOutput) -> ResourceSummary {
    let status = match output.cache_clusters().first() {
        Some(cluster) => reported(cluster.cache_cluster_status()),
        None => ResourceStatus::NotFound,
    };
    ResourceSummary::new(id, status)
}

/// The first load balancer whose name contains `prefix`
pub fn find_load_balancer(prefix: &str, load_balancers: &[LoadBalancer]) -> ResourceSummary {
    let found = load_balancers
        .iter()
        .find(|lb| lb.load_balancer_name().is_some_and(|name| name.contains(prefix)));

    match found {
        Some(lb) => ResourceSummary::new(
            lb.load_balancer_name().unwrap_or(prefix),
            reported(lb.state().and_then(|s| s.code()).map(|code| code.as_str())),
        ),
        None => ResourceSummary::new(prefix, ResourceStatus::NotFound),
    }
}

fn reported(status: Option<&str>) -> ResourceStatus {
    match status {
        Some(status) => ResourceStatus::Reported(status.to_string()),
        None => ResourceStatus::Error("status missing from response".to_string()),
    }
}
