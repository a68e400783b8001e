//! Run configuration: defaults, the fleet file and the resolved, immutable
//! `CheckConfig` handed to every component.

mod constants;
mod fleet_file;
mod settings;

pub use constants::*;
pub use fleet_file::{FleetEntry, FleetFile};
pub use settings::{CheckConfig, InfrastructureTargets, OutputFormat, PollPolicy, ServiceTarget, Settings};
