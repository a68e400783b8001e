use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_SERVICES, TARGET_GROUP_SUFFIX};
use crate::error::ConfigError;

/// Fleet definition read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetFile {
    #[serde(rename = "service", default)]
    pub services: Vec<FleetEntry>,
}

/// One `[[service]]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FleetEntry {
    pub name: String,
    /// ECS service name; defaults to `{project}-{name}`
    #[serde(default)]
    pub ecs_service: Option<String>,
    /// Target group name or ARN; omit for services without a load balancer
    #[serde(default)]
    pub target_group: Option<String>,
    /// Path joined onto the health base URL
    #[serde(default)]
    pub health_path: Option<String>,
    /// Absolute health URL; takes precedence over `health_path`
    #[serde(default)]
    pub health_url: Option<String>,
}

impl FleetEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ecs_service: None,
            target_group: None,
            health_path: None,
            health_url: None,
        }
    }
}

impl FleetFile {
    /// Load a fleet definition from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::FleetFileRead {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::FleetFileParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// The five services of the default deployment.
    ///
    /// Target groups follow the `{project}-{short}-tg` naming of the load
    /// balancer module, where `short` drops a trailing `-service`.
    pub fn default_fleet(project: Option<&str>) -> Self {
        let services = DEFAULT_SERVICES
            .iter()
            .map(|&(name, health_path)| {
                let short = name.strip_suffix("-service").unwrap_or(name);
                let target_group = match project {
                    Some(project) => format!("{project}-{short}{TARGET_GROUP_SUFFIX}"),
                    None => format!("{short}{TARGET_GROUP_SUFFIX}"),
                };
                FleetEntry {
                    target_group: Some(target_group),
                    health_path: Some(health_path.to_string()),
                    ..FleetEntry::named(name)
                }
            })
            .collect();

        Self { services }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_services_from_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fleet.toml");
        fs::write(
            &path,
            r#"
[[service]]
name = "user-service"
target_group = "shop-user-tg"
health_path = "/users/health/"

[[service]]
name = "worker"
ecs_service = "shop-celery-worker"
"#,
        )
        .unwrap();

        let fleet = FleetFile::load(&path).unwrap();
        assert_eq!(fleet.services.len(), 2);
        assert_eq!(fleet.services[0].target_group.as_deref(), Some("shop-user-tg"));
        assert_eq!(fleet.services[1].ecs_service.as_deref(), Some("shop-celery-worker"));
        assert!(fleet.services[1].target_group.is_none());
        assert!(fleet.services[1].health_path.is_none());
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fleet.toml");
        fs::write(&path, "[[service]]\nname = \"a\"\nport = 8000\n").unwrap();

        let err = FleetFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FleetFileParse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = FleetFile::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FleetFileRead { .. }));
    }

    #[test]
    fn default_fleet_derives_target_groups() {
        let fleet = FleetFile::default_fleet(Some("shop"));
        let names: Vec<_> = fleet.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["api-gateway", "user-service", "product-service", "order-service", "notification-service"]
        );
        assert_eq!(fleet.services[0].target_group.as_deref(), Some("shop-api-gateway-tg"));
        assert_eq!(fleet.services[1].target_group.as_deref(), Some("shop-user-tg"));
        assert_eq!(fleet.services[4].health_path.as_deref(), Some("/notifications/health/"));
    }
}
