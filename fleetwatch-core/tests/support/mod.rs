#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::time::sleep;

use fleetwatch_core::adapters::{EndpointProber, RoutingSource, StatusSource};
use fleetwatch_core::config::{CheckConfig, ServiceTarget, Settings};
use fleetwatch_core::error::AdapterError;
use fleetwatch_core::types::{
    EndpointHealthResult, EndpointOutcome, LifecycleState, RoutingHealth, ServiceRuntimeStatus,
};

pub fn healthy_status() -> ServiceRuntimeStatus {
    ServiceRuntimeStatus::new(2, 2, LifecycleState::Active)
}

/// Replays a script of results per ECS service; the last entry repeats.
/// Services without a script report [`healthy_status`].
#[derive(Default)]
pub struct ScriptedStatus {
    scripts: Mutex<HashMap<String, VecDeque<Result<ServiceRuntimeStatus, AdapterError>>>>,
    calls: AtomicU32,
}

impl ScriptedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(
        self,
        ecs_service: &str,
        results: impl IntoIterator<Item = Result<ServiceRuntimeStatus, AdapterError>>,
    ) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(ecs_service.to_string(), results.into_iter().collect());
        self
    }

    pub fn always(self, ecs_service: &str, result: Result<ServiceRuntimeStatus, AdapterError>) -> Self {
        self.script(ecs_service, [result])
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedStatus {
    async fn runtime_status(&self, target: &ServiceTarget) -> Result<ServiceRuntimeStatus, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&target.ecs_service) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap(),
            Some(script) => script.front().cloned().unwrap(),
            None => Ok(healthy_status()),
        }
    }
}

/// Fixed routing health per group; unknown groups have two healthy targets
#[derive(Default)]
pub struct FixedRouting {
    groups: HashMap<String, Result<RoutingHealth, AdapterError>>,
}

impl FixedRouting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, name: &str, result: Result<RoutingHealth, AdapterError>) -> Self {
        self.groups.insert(name.to_string(), result);
        self
    }
}

#[async_trait]
impl RoutingSource for FixedRouting {
    async fn routing_health(&self, group: &str) -> Result<RoutingHealth, AdapterError> {
        self.groups
            .get(group)
            .cloned()
            .unwrap_or_else(|| Ok(RoutingHealth::new(2, 2)))
    }
}

/// Fixed probe outcome per URL path; unknown paths are healthy
#[derive(Default)]
pub struct FixedProber {
    paths: HashMap<String, EndpointOutcome>,
}

impl FixedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: &str, outcome: EndpointOutcome) -> Self {
        self.paths.insert(path.to_string(), outcome);
        self
    }
}

#[async_trait]
impl EndpointProber for FixedProber {
    async fn probe(&self, url: &Url, _timeout: Duration) -> EndpointHealthResult {
        EndpointHealthResult {
            outcome: self
                .paths
                .get(url.path())
                .copied()
                .unwrap_or(EndpointOutcome::Healthy),
            latency: Duration::from_millis(5),
        }
    }
}

/// Wraps a fake so every call takes `delay` before answering
pub struct Delayed<T> {
    inner: T,
    delay: Duration,
}

impl<T> Delayed<T> {
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<T: StatusSource> StatusSource for Delayed<T> {
    async fn runtime_status(&self, target: &ServiceTarget) -> Result<ServiceRuntimeStatus, AdapterError> {
        sleep(self.delay).await;
        self.inner.runtime_status(target).await
    }
}

#[async_trait]
impl<T: RoutingSource> RoutingSource for Delayed<T> {
    async fn routing_health(&self, group: &str) -> Result<RoutingHealth, AdapterError> {
        sleep(self.delay).await;
        self.inner.routing_health(group).await
    }
}

#[async_trait]
impl<T: EndpointProber> EndpointProber for Delayed<T> {
    async fn probe(&self, url: &Url, timeout: Duration) -> EndpointHealthResult {
        sleep(self.delay).await;
        self.inner.probe(url, timeout).await
    }
}

/// The default five-service fleet of project `shop` behind a test base URL
pub fn shop_config() -> CheckConfig {
    CheckConfig::resolve(Settings {
        project: Some("shop".into()),
        health_base_url: Some("http://alb.test".into()),
        ..Settings::default()
    })
    .unwrap()
}
