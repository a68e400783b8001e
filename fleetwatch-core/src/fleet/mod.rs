//! Fleet-wide checks
//!
//! This module provides high-level functions for checking a whole fleet:
//! - Preflight against the cluster and credential chain
//! - Concurrent convergence polling of every service
//! - Reduction of per-service verdicts into one overall verdict

mod check;
mod summarizer;
mod verdict;

pub use check::{check_fleet, run_fleet_check};
pub use summarizer::{FleetSummarizer, FleetSummary};
pub use verdict::{FleetVerdict, OverallHealth, ServiceVerdict};
