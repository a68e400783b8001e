//! Per-service convergence polling
//!
//! This module provides:
//! - The stability condition evaluated on each sample
//! - The fixed-interval poller with a bounded deadline and cancellation

mod poller;
mod stability;

pub use poller::{Convergence, ConvergencePoller, PollOutcome};
pub use stability::{Sample, UnstableReason};
