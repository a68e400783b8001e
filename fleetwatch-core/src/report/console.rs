use std::fmt::Write;

use console::style;

use super::RunReport;
use crate::convergence::Convergence;
use crate::fleet::{OverallHealth, ServiceVerdict};
use crate::utils::{format_elapsed, format_report_time};

const RULE_WIDTH: usize = 80;

/// Human-readable status table
pub fn render_console(report: &RunReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    // writing into a String cannot fail
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "FLEET HEALTH CHECK");
    let _ = writeln!(out, "{rule}");
    if let Some(project) = &report.project {
        let _ = writeln!(out, "Project:     {project}");
    }
    let _ = writeln!(out, "Environment: {}", report.environment);
    let _ = writeln!(out, "Region:      {}", report.region);
    match &report.cluster_summary {
        Some(c) => {
            let _ = writeln!(
                out,
                "Cluster:     {} ({}, {} running / {} pending tasks, {} services)",
                c.name, c.status, c.running_tasks, c.pending_tasks, c.active_services
            );
        }
        None => {
            let _ = writeln!(out, "Cluster:     {}", report.cluster);
        }
    }
    if let Some(infra) = &report.infrastructure {
        for (label, resource) in [
            ("Database:", &infra.database),
            ("Cache:", &infra.cache),
            ("ALB:", &infra.load_balancer),
        ] {
            let _ = writeln!(out, "{label:<13}{} ({})", resource.id, resource.status);
        }
    }
    let _ = writeln!(out, "Started:     {}", format_report_time(report.started_at));
    let _ = writeln!(out);

    let name_width = report
        .fleet
        .services
        .iter()
        .map(|v| v.identity.name.len())
        .max()
        .unwrap_or(0)
        .max("SERVICE".len());

    let _ = writeln!(
        out,
        "{:<name_width$}  {:<10}  {:<7}  {:<7}  {:<12}  {:>8}  {:>7}",
        "SERVICE", "RESULT", "TASKS", "TARGETS", "ENDPOINT", "ATTEMPTS", "ELAPSED"
    );
    for verdict in &report.fleet.services {
        let _ = writeln!(out, "{}", service_row(verdict, name_width));
    }

    let unstable: Vec<_> = report.fleet.services.iter().filter(|v| !v.is_stable).collect();
    if !unstable.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Unstable services:");
        for verdict in unstable {
            for reason in &verdict.reasons {
                let _ = writeln!(out, "  {}: {reason}", verdict.identity.name);
            }
        }
    }

    let verdict = &report.fleet.verdict;
    let summary = format!(
        "{} ({}/{} services healthy)",
        verdict.overall, verdict.healthy_count, verdict.total_count
    );
    let summary = match verdict.overall {
        OverallHealth::AllHealthy => style(summary).green().bold(),
        OverallHealth::PartiallyHealthy => style(summary).yellow().bold(),
        OverallHealth::AllUnhealthy => style(summary).red().bold(),
    };
    let _ = writeln!(out);
    let _ = writeln!(out, "Overall: {summary}");
    let _ = write!(out, "{rule}");

    out
}

fn service_row(verdict: &ServiceVerdict, name_width: usize) -> String {
    let result = match verdict.convergence {
        Convergence::Converged => style(format!("{:<10}", "converged")).green(),
        Convergence::TimedOut => style(format!("{:<10}", "timed out")).red(),
        Convergence::Cancelled => style(format!("{:<10}", "cancelled")).yellow(),
    };

    let tasks = verdict
        .runtime_status
        .as_ref()
        .map(|s| format!("{}/{}", s.running_replica_count, s.desired_replica_count))
        .unwrap_or_else(|| "-".to_string());
    let targets = verdict
        .routing_health
        .filter(|h| h.has_targets())
        .map(|h| format!("{}/{}", h.healthy_endpoint_count(), h.total_endpoint_count()))
        .unwrap_or_else(|| "-".to_string());
    let endpoint = verdict
        .endpoint_result
        .map(|r| r.outcome.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<name_width$}  {result}  {tasks:<7}  {targets:<7}  {endpoint:<12}  {:>8}  {:>7}",
        verdict.identity.name,
        verdict.attempts,
        format_elapsed(verdict.elapsed),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::UnstableReason;
    use crate::fleet::{FleetSummary, FleetVerdict};
    use crate::types::{
        ClusterSummary, EndpointHealthResult, EndpointOutcome, InfrastructureSummary, LifecycleState,
        ResourceStatus, ResourceSummary, RoutingHealth, ServiceIdentity, ServiceRuntimeStatus,
    };
    use chrono::Utc;
    use std::time::Duration;

    fn verdict(name: &str, stable: bool) -> ServiceVerdict {
        ServiceVerdict {
            identity: ServiceIdentity::new(name, "shop-cluster"),
            is_stable: stable,
            convergence: if stable { Convergence::Converged } else { Convergence::TimedOut },
            attempts: if stable { 1 } else { 21 },
            elapsed: if stable { Duration::from_millis(40) } else { Duration::from_secs(600) },
            runtime_status: Some(ServiceRuntimeStatus::new(2, if stable { 2 } else { 0 }, LifecycleState::Active)),
            routing_health: Some(RoutingHealth::new(if stable { 2 } else { 0 }, 2)),
            endpoint_result: Some(EndpointHealthResult {
                outcome: if stable { EndpointOutcome::Healthy } else { EndpointOutcome::UnexpectedStatus(503) },
                latency: Duration::from_millis(8),
            }),
            reasons: if stable {
                vec![]
            } else {
                vec![
                    UnstableReason::ReplicasNotConverged { running: 0, desired: 2 },
                    UnstableReason::EndpointUnhealthy(EndpointOutcome::UnexpectedStatus(503)),
                ]
            },
        }
    }

    fn report(services: Vec<ServiceVerdict>) -> RunReport {
        let verdict = FleetVerdict::from_verdicts(&services);
        RunReport {
            project: Some("shop".into()),
            environment: "staging".into(),
            region: "eu-west-1".into(),
            cluster: "shop-cluster".into(),
            cluster_summary: Some(ClusterSummary {
                name: "shop-cluster".into(),
                status: "ACTIVE".into(),
                running_tasks: 8,
                pending_tasks: 0,
                active_services: 5,
            }),
            infrastructure: None,
            started_at: Utc::now(),
            fleet: FleetSummary { services, verdict },
        }
    }

    #[test]
    fn table_lists_every_service_and_reasons() {
        let text = render_console(&report(vec![
            verdict("api-gateway", true),
            verdict("order-service", false),
        ]));

        assert!(text.contains("Project:     shop"));
        assert!(text.contains("shop-cluster (ACTIVE, 8 running / 0 pending tasks, 5 services)"));
        assert!(text.contains("api-gateway"));
        assert!(text.contains("converged"));
        assert!(text.contains("timed out"));
        assert!(text.contains("0/2"));
        assert!(text.contains("HTTP 503"));
        assert!(text.contains("order-service: running tasks 0, expected 2"));
        assert!(text.contains("order-service: health endpoint returned HTTP 503, expected 2xx"));
        assert!(text.contains("fleet partially healthy (1/2 services healthy)"));
    }

    #[test]
    fn healthy_fleet_has_no_unstable_section() {
        let text = render_console(&report(vec![verdict("api-gateway", true)]));
        assert!(!text.contains("Unstable services"));
        assert!(text.contains("all services healthy (1/1 services healthy)"));
    }

    #[test]
    fn infrastructure_is_listed_without_touching_the_verdict() {
        let mut report = report(vec![verdict("api-gateway", true)]);
        report.infrastructure = Some(InfrastructureSummary {
            database: ResourceSummary::new("shop-db", ResourceStatus::Reported("available".into())),
            cache: ResourceSummary::new("shop-redis", ResourceStatus::NotFound),
            load_balancer: ResourceSummary::new("shop", ResourceStatus::Error("elbv2: throttled".into())),
        });

        let text = render_console(&report);
        assert!(text.contains("Database:    shop-db (available)"));
        assert!(text.contains("Cache:       shop-redis (not found)"));
        assert!(text.contains("ALB:         shop (error: elbv2: throttled)"));
        assert!(text.contains("all services healthy (1/1 services healthy)"));
        assert_eq!(report.exit_code(), 0);
    }
}
