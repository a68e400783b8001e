//! Rendering of a finished run for operators

mod console;
mod json;

pub use console::render_console;
pub use json::render_json;

use chrono::{DateTime, Utc};

use crate::config::{CheckConfig, OutputFormat};
use crate::fleet::FleetSummary;
use crate::types::{ClusterSummary, InfrastructureSummary};

/// Everything one invocation observed
#[derive(Debug, Clone)]
pub struct RunReport {
    pub project: Option<String>,
    pub environment: String,
    pub region: String,
    pub cluster: String,
    pub cluster_summary: Option<ClusterSummary>,
    /// Report-only; never changes the verdict
    pub infrastructure: Option<InfrastructureSummary>,
    pub started_at: DateTime<Utc>,
    pub fleet: FleetSummary,
}

impl RunReport {
    pub fn new(
        config: &CheckConfig,
        cluster_summary: Option<ClusterSummary>,
        infrastructure: Option<InfrastructureSummary>,
        started_at: DateTime<Utc>,
        fleet: FleetSummary,
    ) -> Self {
        Self {
            project: config.project.clone(),
            environment: config.environment.clone(),
            region: config.region.clone(),
            cluster: config.cluster.clone(),
            cluster_summary,
            infrastructure,
            started_at,
            fleet,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.fleet.verdict.exit_code()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Console => Ok(render_console(self)),
            OutputFormat::Json => render_json(self),
        }
    }
}
