//! Command-line arguments.
//!
//! Every option can also be supplied through the environment variable the
//! deployment scripts already export.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use fleetwatch_core::config::{
    OutputFormat, Settings, MAX_WAIT_SECS, POLL_INTERVAL_SECS, PROBE_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS,
};

/// Wait for an ECS service fleet to converge after a deployment.
#[derive(Parser, Debug)]
#[command(name = "fleetwatch")]
#[command(version)]
#[command(about = "Wait for an ECS service fleet to converge after a deployment")]
#[command(long_about = "Polls every service of the fleet until its tasks, load-balancer targets \
    and health endpoint agree that it is stable, or until the deadline passes.\n\n\
    Exit codes: 0 all healthy, 1 partially healthy, 2 none healthy, 3 fatal error, \
    130 interrupted.")]
pub struct Cli {
    /// Project name; prefixes the cluster, ECS service and target group names.
    #[arg(long, env = "PROJECT_NAME")]
    pub project: Option<String>,

    /// Environment label shown in the report.
    #[arg(long, env = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// ECS cluster name (default: {project}-cluster).
    #[arg(long, env = "CLUSTER_NAME")]
    pub cluster: Option<String>,

    /// AWS region.
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Base URL the health paths are joined onto; probes are skipped when unset.
    #[arg(long, env = "HEALTH_BASE_URL")]
    pub health_base_url: Option<String>,

    /// TOML fleet definition (default: the five standard services).
    #[arg(long = "fleet", env = "FLEET_FILE")]
    pub fleet_file: Option<PathBuf>,

    /// RDS instance reported in the header (default: {project}-db).
    #[arg(long, env = "DB_INSTANCE_ID")]
    pub database_id: Option<String>,

    /// ElastiCache cluster reported in the header (default: {project}-redis).
    #[arg(long, env = "REDIS_CLUSTER_ID")]
    pub cache_cluster_id: Option<String>,

    /// Do not describe the database, cache and load balancer.
    #[arg(long, env = "SKIP_INFRASTRUCTURE")]
    pub skip_infrastructure: bool,

    /// Seconds between samples of one service.
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = POLL_INTERVAL_SECS)]
    pub interval: u64,

    /// Seconds a service may take to converge.
    #[arg(long, env = "MAX_WAIT_SECS", default_value_t = MAX_WAIT_SECS)]
    pub max_wait: u64,

    /// Timeout in seconds for each ECS or ELB API call.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,

    /// Timeout in seconds for each HTTP health probe.
    #[arg(long, env = "PROBE_TIMEOUT_SECS", default_value_t = PROBE_TIMEOUT_SECS)]
    pub probe_timeout: u64,

    /// Report format written to stdout.
    #[arg(long, env = "OUTPUT_FORMAT", value_enum, default_value_t = OutputArg::Console)]
    pub output: OutputArg,

    /// Log progress to stderr (-v debug).
    #[arg(short, long, action = ArgAction::SetTrue, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging entirely.
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputArg {
    Console,
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Console => OutputFormat::Console,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            project: self.project.clone(),
            environment: self.environment.clone(),
            cluster: self.cluster.clone(),
            region: self.region.clone(),
            health_base_url: self.health_base_url.clone(),
            fleet_file: self.fleet_file.clone(),
            database_id: self.database_id.clone(),
            cache_cluster_id: self.cache_cluster_id.clone(),
            skip_infrastructure: self.skip_infrastructure,
            poll_interval: Duration::from_secs(self.interval),
            max_wait: Duration::from_secs(self.max_wait),
            request_timeout: Duration::from_secs(self.request_timeout),
            probe_timeout: Duration::from_secs(self.probe_timeout),
            output: self.output.into(),
        }
    }
}
