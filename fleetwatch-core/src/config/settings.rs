use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::Serialize;

use super::constants::*;
use super::fleet_file::{FleetEntry, FleetFile};
use crate::error::ConfigError;
use crate::types::ServiceIdentity;

/// How the final report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

/// Raw settings as collected from flags and environment variables
#[derive(Debug, Clone)]
pub struct Settings {
    pub project: Option<String>,
    pub environment: Option<String>,
    pub cluster: Option<String>,
    pub region: Option<String>,
    pub health_base_url: Option<String>,
    pub fleet_file: Option<PathBuf>,
    pub database_id: Option<String>,
    pub cache_cluster_id: Option<String>,
    /// Leave database, cache and load balancer out of the report
    pub skip_infrastructure: bool,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project: None,
            environment: None,
            cluster: None,
            region: None,
            health_base_url: None,
            fleet_file: None,
            database_id: None,
            cache_cluster_id: None,
            skip_infrastructure: false,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_wait: Duration::from_secs(MAX_WAIT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            output: OutputFormat::Console,
        }
    }
}

/// Timing of the convergence loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_wait: Duration::from_secs(MAX_WAIT_SECS),
        }
    }
}

/// A fleet member and where to look for its health
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    pub identity: ServiceIdentity,
    pub ecs_service: String,
    pub target_group: Option<String>,
    pub health_url: Option<Url>,
}

impl ServiceTarget {
    /// A target whose ECS service name equals its own name, with no
    /// routing group and no health URL.
    pub fn new(name: impl Into<String>, cluster: impl Into<String>) -> Self {
        let identity = ServiceIdentity::new(name, cluster);
        Self {
            ecs_service: identity.name.clone(),
            identity,
            target_group: None,
            health_url: None,
        }
    }

    pub fn with_target_group(mut self, target_group: impl Into<String>) -> Self {
        self.target_group = Some(target_group.into());
        self
    }

    pub fn with_health_url(mut self, url: Url) -> Self {
        self.health_url = Some(url);
        self
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }
}

/// Supporting resources described in the report header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfrastructureTargets {
    pub database_id: String,
    pub cache_cluster_id: String,
    /// Load balancers whose name contains this are reported
    pub load_balancer_prefix: String,
}

impl InfrastructureTargets {
    /// Resource names derived from the project, with explicit overrides
    pub fn for_project(project: &str, database_id: Option<&str>, cache_cluster_id: Option<&str>) -> Self {
        Self {
            database_id: database_id
                .map(str::to_string)
                .unwrap_or_else(|| format!("{project}{DATABASE_SUFFIX}")),
            cache_cluster_id: cache_cluster_id
                .map(str::to_string)
                .unwrap_or_else(|| format!("{project}{CACHE_SUFFIX}")),
            load_balancer_prefix: project.to_string(),
        }
    }
}

/// Immutable configuration for one health-check run
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub project: Option<String>,
    pub environment: String,
    pub region: String,
    pub cluster: String,
    pub poll: PollPolicy,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub output: OutputFormat,
    /// `None` without a project name or when skipped
    pub infrastructure: Option<InfrastructureTargets>,
    pub services: Vec<ServiceTarget>,
}

impl CheckConfig {
    /// Validate settings and resolve the fleet, reading the fleet file if one
    /// is configured.
    pub fn resolve(settings: Settings) -> Result<Self, ConfigError> {
        let fleet = match &settings.fleet_file {
            Some(path) => FleetFile::load(path)?,
            None => FleetFile::default_fleet(non_empty(&settings.project)),
        };
        Self::from_fleet(settings, fleet)
    }

    /// Validate settings against an already loaded fleet definition
    pub fn from_fleet(settings: Settings, fleet: FleetFile) -> Result<Self, ConfigError> {
        let project = non_empty(&settings.project).map(str::to_string);
        let cluster = match (non_empty(&settings.cluster), project.as_deref()) {
            (Some(cluster), _) => cluster.to_string(),
            (None, Some(project)) => format!("{project}{CLUSTER_SUFFIX}"),
            (None, None) => return Err(ConfigError::MissingCluster),
        };

        if settings.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll interval"));
        }
        if settings.max_wait.is_zero() {
            return Err(ConfigError::ZeroDuration("maximum wait"));
        }
        if settings.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request timeout"));
        }
        if settings.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("probe timeout"));
        }
        if settings.poll_interval > settings.max_wait {
            return Err(ConfigError::IntervalExceedsDeadline {
                interval: settings.poll_interval,
                max_wait: settings.max_wait,
            });
        }

        if fleet.services.is_empty() {
            return Err(ConfigError::EmptyFleet);
        }

        let base_url = non_empty(&settings.health_base_url);
        let mut seen = HashSet::new();
        let mut services = Vec::with_capacity(fleet.services.len());
        for (index, entry) in fleet.services.into_iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::BlankServiceName(index + 1));
            }
            if !seen.insert(entry.name.clone()) {
                return Err(ConfigError::DuplicateService(entry.name));
            }
            services.push(resolve_entry(entry, &cluster, project.as_deref(), base_url)?);
        }

        let infrastructure = match project.as_deref() {
            Some(project) if !settings.skip_infrastructure => Some(InfrastructureTargets::for_project(
                project,
                non_empty(&settings.database_id),
                non_empty(&settings.cache_cluster_id),
            )),
            _ => None,
        };

        Ok(Self {
            project,
            environment: non_empty(&settings.environment)
                .unwrap_or(DEFAULT_ENVIRONMENT)
                .to_string(),
            region: non_empty(&settings.region).unwrap_or(DEFAULT_REGION).to_string(),
            cluster,
            poll: PollPolicy {
                interval: settings.poll_interval,
                max_wait: settings.max_wait,
            },
            request_timeout: settings.request_timeout,
            probe_timeout: settings.probe_timeout,
            output: settings.output,
            infrastructure,
            services,
        })
    }
}

fn resolve_entry(
    entry: FleetEntry,
    cluster: &str,
    project: Option<&str>,
    base_url: Option<&str>,
) -> Result<ServiceTarget, ConfigError> {
    let ecs_service = match (entry.ecs_service, project) {
        (Some(ecs_service), _) => ecs_service,
        (None, Some(project)) => format!("{project}-{}", entry.name),
        (None, None) => entry.name.clone(),
    };

    let raw_url = match (entry.health_url, entry.health_path, base_url) {
        (Some(url), _, _) => Some(url),
        (None, Some(path), Some(base)) => Some(join_url(base, &path)),
        _ => None,
    };
    let health_url = raw_url
        .map(|raw| parse_health_url(&entry.name, raw))
        .transpose()?;

    Ok(ServiceTarget {
        identity: ServiceIdentity::new(entry.name, cluster),
        ecs_service,
        target_group: entry.target_group.filter(|tg| !tg.trim().is_empty()),
        health_url,
    })
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn parse_health_url(service: &str, raw: String) -> Result<Url, ConfigError> {
    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ConfigError::InvalidUrl {
            service: service.to_string(),
            url: raw,
        }),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
