// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for the data-access layer
//!
//! Every limit has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! max_page_size = 50
//! cache_capacity = 10000
//! remote_timeout = "5s"
//!
//! [rate_limit]
//! max_requests = 20
//! window = "30s"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Sliding-window admission limits, applied per actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 50,
            window: Duration::from_secs(60),
        }
    }
}

/// Limits and tunables for a `DocumentAccess` instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub rate_limit: RateLimitConfig,
    /// Ceiling for bulk-read page sizes
    pub max_page_size: usize,
    /// String cap for fields without a cap of their own
    pub max_string_len: usize,
    /// Array cap for fields without a cap of their own
    pub max_array_len: usize,
    /// LRU bound for the mirror cache; unbounded when absent
    pub cache_capacity: Option<usize>,
    /// Upper bound on any single remote call
    #[serde(with = "humantime_serde")]
    pub remote_timeout: Duration,
    /// Audit records queued beyond this are dropped
    pub audit_queue_capacity: usize,
    /// Entity kind audit records are written under
    pub audit_collection: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            max_page_size: 100,
            max_string_len: 1000,
            max_array_len: 50,
            cache_capacity: None,
            remote_timeout: Duration::from_secs(10),
            audit_queue_capacity: 256,
            audit_collection: "audit_logs".to_string(),
        }
    }
}

impl AccessConfig {
    /// Parse a TOML document, filling unspecified keys with defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_rate_limit(mut self, max_requests: usize, window: Duration) -> Self {
        self.rate_limit = RateLimitConfig {
            max_requests,
            window,
        };
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_max_page_size(mut self, max: usize) -> Self {
        self.max_page_size = max;
        self
    }

    pub fn with_audit_queue_capacity(mut self, capacity: usize) -> Self {
        self.audit_queue_capacity = capacity;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
