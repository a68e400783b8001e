use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RunReport;
use crate::convergence::Convergence;
use crate::fleet::{FleetVerdict, ServiceVerdict};
use crate::types::{
    duration_millis, ClusterSummary, EndpointHealthResult, InfrastructureSummary, RoutingHealth, ServiceRuntimeStatus,
};

#[derive(Serialize)]
struct JsonReport<'a> {
    project: Option<&'a str>,
    environment: &'a str,
    region: &'a str,
    cluster: &'a str,
    cluster_summary: Option<&'a ClusterSummary>,
    infrastructure: Option<&'a InfrastructureSummary>,
    started_at: DateTime<Utc>,
    verdict: &'a FleetVerdict,
    exit_code: i32,
    services: Vec<JsonService<'a>>,
}

#[derive(Serialize)]
struct JsonService<'a> {
    name: &'a str,
    cluster: &'a str,
    stable: bool,
    convergence: Convergence,
    attempts: u32,
    #[serde(rename = "elapsed_ms", with = "duration_millis")]
    elapsed: std::time::Duration,
    runtime_status: Option<&'a ServiceRuntimeStatus>,
    routing_health: Option<JsonRouting>,
    endpoint: Option<&'a EndpointHealthResult>,
    reasons: Vec<String>,
}

#[derive(Serialize)]
struct JsonRouting {
    healthy: u32,
    unhealthy: u32,
    total: u32,
}

impl From<RoutingHealth> for JsonRouting {
    fn from(health: RoutingHealth) -> Self {
        Self {
            healthy: health.healthy_endpoint_count(),
            unhealthy: health.unhealthy_endpoint_count(),
            total: health.total_endpoint_count(),
        }
    }
}

impl<'a> From<&'a ServiceVerdict> for JsonService<'a> {
    fn from(verdict: &'a ServiceVerdict) -> Self {
        Self {
            name: &verdict.identity.name,
            cluster: &verdict.identity.cluster,
            stable: verdict.is_stable,
            convergence: verdict.convergence,
            attempts: verdict.attempts,
            elapsed: verdict.elapsed,
            runtime_status: verdict.runtime_status.as_ref(),
            routing_health: verdict.routing_health.map(JsonRouting::from),
            endpoint: verdict.endpoint_result.as_ref(),
            reasons: verdict.reasons.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Machine-readable report for pipelines
pub fn render_json(report: &RunReport) -> Result<String, serde_json::Error> {
    let view = JsonReport {
        project: report.project.as_deref(),
        environment: &report.environment,
        region: &report.region,
        cluster: &report.cluster,
        cluster_summary: report.cluster_summary.as_ref(),
        infrastructure: report.infrastructure.as_ref(),
        started_at: report.started_at,
        verdict: &report.fleet.verdict,
        exit_code: report.exit_code(),
        services: report.fleet.services.iter().map(JsonService::from).collect(),
    };
    serde_json::to_string_pretty(&view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::UnstableReason;
    use crate::fleet::FleetSummary;
    use crate::types::{EndpointOutcome, LifecycleState, ResourceStatus, ResourceSummary, ServiceIdentity};
    use serde_json::Value;
    use std::time::Duration;

    fn report() -> RunReport {
        let services = vec![
            ServiceVerdict {
                identity: ServiceIdentity::new("api-gateway", "shop-cluster"),
                is_stable: true,
                convergence: Convergence::Converged,
                attempts: 1,
                elapsed: Duration::from_millis(120),
                runtime_status: Some(ServiceRuntimeStatus::new(2, 2, LifecycleState::Active)),
                routing_health: Some(RoutingHealth::new(2, 3)),
                endpoint_result: Some(EndpointHealthResult {
                    outcome: EndpointOutcome::Healthy,
                    latency: Duration::from_millis(15),
                }),
                reasons: vec![],
            },
            ServiceVerdict {
                identity: ServiceIdentity::new("notification-service", "shop-cluster"),
                is_stable: false,
                convergence: Convergence::TimedOut,
                attempts: 21,
                elapsed: Duration::from_secs(600),
                runtime_status: None,
                routing_health: None,
                endpoint_result: None,
                reasons: vec![UnstableReason::NotFound],
            },
        ];
        let verdict = FleetVerdict::from_verdicts(&services);
        RunReport {
            project: Some("shop".into()),
            environment: "dev".into(),
            region: "us-east-1".into(),
            cluster: "shop-cluster".into(),
            cluster_summary: None,
            infrastructure: None,
            started_at: Utc::now(),
            fleet: FleetSummary { services, verdict },
        }
    }

    #[test]
    fn json_report_carries_verdict_and_reasons() {
        let text = render_json(&report()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["exit_code"], 1);
        assert_eq!(value["verdict"]["overall"], "PartiallyHealthy");
        assert_eq!(value["verdict"]["healthy_count"], 1);
        assert_eq!(value["verdict"]["total_count"], 2);

        let services = value["services"].as_array().unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0]["name"], "api-gateway");
        assert_eq!(services[0]["stable"], true);
        assert_eq!(services[0]["elapsed_ms"], 120);
        assert_eq!(services[0]["endpoint"]["outcome"]["kind"], "Healthy");
        assert_eq!(services[0]["routing_health"]["unhealthy"], 1);
        assert_eq!(services[0]["routing_health"]["total"], 3);

        assert_eq!(services[1]["convergence"], "TimedOut");
        assert!(services[1]["runtime_status"].is_null());
        let reason = services[1]["reasons"][0].as_str().unwrap();
        assert!(reason.starts_with("NotFound"));
    }

    #[test]
    fn infrastructure_is_serialised_when_present() {
        let mut report = report();
        let text = render_json(&report).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value["infrastructure"].is_null());

        report.infrastructure = Some(InfrastructureSummary {
            database: ResourceSummary::new("shop-db", ResourceStatus::Reported("available".into())),
            cache: ResourceSummary::new("shop-redis", ResourceStatus::NotFound),
            load_balancer: ResourceSummary::new("shop-alb", ResourceStatus::Reported("active".into())),
        });
        let text = render_json(&report).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["infrastructure"]["database"]["id"], "shop-db");
        assert_eq!(value["infrastructure"]["database"]["status"]["value"], "available");
        assert_eq!(value["infrastructure"]["cache"]["status"]["kind"], "NotFound");
        assert_eq!(value["exit_code"], 1);
    }
}
