use std::time::Duration;

use thiserror::Error;

/// Failure of a single adapter call during one polling tick.
///
/// Every variant is recoverable: the poller treats it as "not stable this tick".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The service is not registered with the fleet-management API.
    #[error("service {0} not found")]
    NotFound(String),
    #[error("API unavailable: {0}")]
    Unavailable(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// Credentials were rejected. Fatal when seen during preflight.
    #[error("credentials rejected: {0}")]
    Unauthorized(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl AdapterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Invalid or incomplete configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no cluster name: set CLUSTER_NAME or PROJECT_NAME")]
    MissingCluster,
    #[error("fleet has no services")]
    EmptyFleet,
    #[error("service entry {0} has a blank name")]
    BlankServiceName(usize),
    #[error("service {0} is listed more than once")]
    DuplicateService(String),
    #[error("invalid health URL for {service}: {url}")]
    InvalidUrl { service: String, url: String },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("poll interval {interval:?} exceeds maximum wait {max_wait:?}")]
    IntervalExceedsDeadline { interval: Duration, max_wait: Duration },
    #[error("failed to read fleet file {path}: {source}")]
    FleetFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse fleet file {path}: {source}")]
    FleetFileParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Fatal error that aborts the whole run
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no AWS credentials available: {0}")]
    NoCredentials(String),
    #[error("authentication to {api} failed: {message}")]
    Authentication { api: &'static str, message: String },
    #[error("cluster {0} not found")]
    ClusterNotFound(String),
    #[error("interrupted before polling started")]
    Interrupted,
}
