//! Deployment health-convergence checks for an ECS service fleet.
//!
//! After a rollout, every configured service is polled on a fixed interval
//! until its tasks, load-balancer targets and HTTP health endpoint agree
//! that it is stable, or until a bounded deadline passes. The per-service
//! verdicts reduce to a single fleet verdict and process exit code.

pub mod adapters;
pub mod aws;
pub mod config;
pub mod convergence;
pub mod error;
pub mod fleet;
pub mod probe;
pub mod report;
pub mod types;
pub mod utils;

pub use error::{AdapterError, CheckError, ConfigError};
pub use fleet::{check_fleet, run_fleet_check, FleetSummary, FleetVerdict, OverallHealth, ServiceVerdict};
pub use report::RunReport;
pub use types::Result;
