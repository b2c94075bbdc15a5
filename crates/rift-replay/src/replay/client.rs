//! Shared HTTP client creation.

use crate::config::ReplayConfig;
use crate::error::{ReplayError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// The pooled client every replay task dispatches through, with the settings it was built from.
///
/// Built once per run and only read afterwards. `reqwest::Client` is a
/// handle onto a shared, internally synchronized pool, so cloning it into
/// tasks shares connections rather than copying them.
#[derive(Debug, Clone)]
pub struct ReplayClient {
    http: Client,
    config: ReplayConfig,
}

impl ReplayClient {
    pub fn new(config: ReplayConfig) -> Result<Self> {
        config.validate()?;
        let pool = &config.connection_pool;

        if config.insecure {
            warn!("TLS certificate verification DISABLED for replayed requests");
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(pool.effective_idle_per_host())
            .pool_idle_timeout(Duration::from_secs(pool.idle_timeout_secs))
            // The recorded request's own status is what gets reported
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| ReplayError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            "Connection pool configured: max_conns_per_host={}, max_idle_per_host={}, timeout={}ms",
            pool.max_conns_per_host,
            pool.effective_idle_per_host(),
            config.timeout_ms
        );

        Ok(Self { http, config })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_config() {
        let client = ReplayClient::new(ReplayConfig::default()).unwrap();
        assert_eq!(client.config().timeout_ms, 5_000);
        assert_eq!(client.config().connection_pool.max_conns_per_host, 5);
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ReplayConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            ReplayClient::new(config),
            Err(ReplayError::Config(_))
        ));
    }
}
