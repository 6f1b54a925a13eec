/// Client configuration.
///
/// Layered: built-in defaults, then an optional JSON file, then
/// `SPACESCOPE_*` environment variables. The binary applies CLI flags on
/// top of whatever [`ClientConfig::load`] returns.
use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::server_url`].
pub const ENV_SERVER_URL: &str = "SPACESCOPE_SERVER_URL";
/// Environment variable overriding [`ClientConfig::poll_interval_ms`].
pub const ENV_POLL_MS: &str = "SPACESCOPE_POLL_MS";

/// Limits applied when flattening the nested scan result.
///
/// Large trees freeze the chart renderer, so the flat dataset is capped in
/// total size, depth, and per-node fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenLimits {
    /// Hard cap on the number of emitted records.
    pub max_nodes: usize,
    /// Nodes deeper than this are dropped (root is depth 0).
    pub max_depth: usize,
    /// Children kept under the root.
    pub base_children: usize,
    /// Fan-out reduction per level of depth.
    pub children_step: usize,
    /// Fan-out never drops below this.
    pub min_children: usize,
}

impl Default for FlattenLimits {
    fn default() -> Self {
        Self {
            max_nodes: 300,
            max_depth: 8,
            base_children: 20,
            children_step: 2,
            min_children: 5,
        }
    }
}

impl FlattenLimits {
    /// No limits at all; every node of the nested result is emitted.
    pub fn unlimited() -> Self {
        Self {
            max_nodes: usize::MAX,
            max_depth: usize::MAX,
            base_children: usize::MAX,
            children_step: 0,
            min_children: usize::MAX,
        }
    }

    /// Maximum number of children emitted under a node at `depth`.
    pub fn children_at(&self, depth: usize) -> usize {
        self.base_children
            .saturating_sub(depth.saturating_mul(self.children_step))
            .max(self.min_children)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the remote scan engine, without trailing slash.
    pub server_url: String,
    /// Fixed delay between progress polls.
    pub poll_interval_ms: u64,
    /// Per-request timeout for every call to the remote engine.
    pub request_timeout_ms: u64,
    /// Bounded wait for the chart renderer.
    pub render_timeout_ms: u64,
    /// Parent of all user home directories (`/Users` on macOS).
    pub home_root: String,
    /// Username used when path discovery fails.
    pub fallback_username: String,
    pub flatten: FlattenLimits,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 2_000,
            request_timeout_ms: 10_000,
            render_timeout_ms: 30_000,
            home_root: "/Users".to_string(),
            fallback_username: "user".to_string(),
            flatten: FlattenLimits::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from an optional JSON file plus environment overrides.
    pub fn load(path: Option<&Path>) -> ScanResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> ScanResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> ScanResult<Self> {
        serde_json::from_str(text).map_err(|e| ScanError::Config(e.to_string()))
    }

    /// Apply `SPACESCOPE_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_SERVER_URL).ok(),
            std::env::var(ENV_POLL_MS).ok(),
        );
    }

    fn apply_overrides(&mut self, server_url: Option<String>, poll_ms: Option<String>) {
        if let Some(url) = server_url.filter(|u| !u.trim().is_empty()) {
            self.server_url = url.trim().to_string();
        }
        if let Some(raw) = poll_ms {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.poll_interval_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid {ENV_POLL_MS}={raw:?}"),
            }
        }
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.server_url.trim().is_empty() {
            return Err(ScanError::Config("server_url must not be empty".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ScanError::Config("poll_interval_ms must be positive".into()));
        }
        if self.flatten.max_nodes == 0 {
            return Err(ScanError::Config("flatten.max_nodes must be positive".into()));
        }
        Ok(())
    }

    /// Server URL with any trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[inline]
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }
}
