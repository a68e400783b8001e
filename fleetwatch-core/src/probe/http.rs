use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio::time::{self, Instant};
use tracing::debug;

use crate::adapters::EndpointProber;
use crate::config::USER_AGENT;
use crate::types::{EndpointHealthResult, EndpointOutcome};

/// Prober issuing one `GET` per call over a shared connection pool
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

#[async_trait]
impl EndpointProber for HttpProber {
    async fn probe(&self, url: &Url, timeout: Duration) -> EndpointHealthResult {
        let started = Instant::now();
        let request = self
            .client
            .get(url.clone())
            .header("User-Agent", USER_AGENT)
            .timeout(timeout)
            .send();

        let outcome = match time::timeout(timeout, request).await {
            Ok(Ok(response)) if response.status().is_success() => EndpointOutcome::Healthy,
            Ok(Ok(response)) => EndpointOutcome::UnexpectedStatus(response.status().as_u16()),
            Ok(Err(err)) => {
                debug!(%url, error = %err, "health probe failed");
                EndpointOutcome::Unreachable
            }
            Err(_) => {
                debug!(%url, ?timeout, "health probe timed out");
                EndpointOutcome::Unreachable
            }
        };

        EndpointHealthResult {
            outcome,
            latency: started.elapsed(),
        }
    }
}
