//! Client and connection pool configuration.

use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Per-request timeout, covering connect, write and response read.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub connection_pool: ConnectionPoolConfig,

    /// Skip TLS certificate verification (self-signed staging targets)
    #[serde(default)]
    pub insecure: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connection_pool: ConnectionPoolConfig::default(),
            insecure: false,
        }
    }
}

impl ReplayConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ReplayConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ReplayError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ReplayError::Config(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.connection_pool.max_conns_per_host == 0 {
            return Err(ReplayError::Config(
                "connection_pool.max_conns_per_host must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConnectionPoolConfig {
    /// Upper bound on idle connections kept per origin. The client has no
    /// pool-wide idle limit, so this caps `max_idle_per_host` rather than the
    /// total across origins.
    #[serde(default = "default_max_idle")]
    pub max_idle: usize,

    /// Requests (and therefore HTTP/1.1 connections) in flight per origin
    #[serde(default = "default_max_conns_per_host")]
    pub max_conns_per_host: usize,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle: default_max_idle(),
            max_conns_per_host: default_max_conns_per_host(),
            max_idle_per_host: default_max_idle_per_host(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl ConnectionPoolConfig {
    /// Per-origin idle cap handed to the client: the smaller of the two
    /// settings. With several origins the pool can hold more than
    /// `max_idle` idle connections in total.
    pub fn effective_idle_per_host(&self) -> usize {
        self.max_idle_per_host.min(self.max_idle)
    }
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_idle() -> usize {
    10
}

fn default_max_conns_per_host() -> usize {
    5
}

fn default_max_idle_per_host() -> usize {
    10
}

fn default_idle_timeout() -> u64 {
    90
}
