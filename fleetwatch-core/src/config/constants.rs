// Fleet health-check configuration constants

/// User agent sent with health probes
pub const USER_AGENT: &str = concat!("fleetwatch/", env!("CARGO_PKG_VERSION"));

/// Region used when neither the flag nor AWS_REGION is set
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment label used when ENVIRONMENT is unset
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Interval between convergence samples in seconds
pub const POLL_INTERVAL_SECS: u64 = 30;

/// Maximum time a single service may take to converge, in seconds
pub const MAX_WAIT_SECS: u64 = 600;

/// Timeout for each ECS / ELB API call in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Timeout for each HTTP health probe in seconds
pub const PROBE_TIMEOUT_SECS: u64 = 10;

/// Suffix appended to the project name to form the cluster name
pub const CLUSTER_SUFFIX: &str = "-cluster";

/// Suffix appended to a service's short name to form its target group name
pub const TARGET_GROUP_SUFFIX: &str = "-tg";

/// Suffix appended to the project name to form the RDS instance identifier
pub const DATABASE_SUFFIX: &str = "-db";

/// Suffix appended to the project name to form the ElastiCache cluster id
pub const CACHE_SUFFIX: &str = "-redis";

/// Services deployed by default, with the health path each one serves
/// behind the shared load balancer.
pub const DEFAULT_SERVICES: &[(&str, &str)] = &[
    ("api-gateway", "/health/"),
    ("user-service", "/users/health/"),
    ("product-service", "/products/health/"),
    ("order-service", "/orders/health/"),
    ("notification-service", "/notifications/health/"),
];
