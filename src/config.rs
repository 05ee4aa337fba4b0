//! Client configuration.
//!
//! Loaded from TOML, then overridden by `SODA_*` environment variables:
//!
//! ```toml
//! domain = "data.cityofnewyork.us"
//! strict = true
//! timeout_secs = 10
//!
//! [auth]
//! app_token = "..."
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::client::AuthOptions;
use crate::error::SodaResult;

const LOCAL_CONFIG: &str = "soda.toml";

/// Main client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SodaConfig {
    /// Domain to query, e.g. `data.cityofnewyork.us`
    pub domain: Option<String>,

    /// Forbid changing the dataset once set
    #[serde(default)]
    pub strict: bool,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub auth: AuthOptions,
}

fn default_timeout() -> u64 {
    30
}

impl Default for SodaConfig {
    fn default() -> Self {
        Self {
            domain: None,
            strict: false,
            timeout_secs: default_timeout(),
            auth: AuthOptions::default(),
        }
    }
}

impl SodaConfig {
    /// Create a new configuration builder
    pub fn builder() -> SodaConfigBuilder {
        SodaConfigBuilder::default()
    }

    pub fn from_toml_str(s: &str) -> SodaResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `path`, else `./soda.toml`, else the user config dir.
    /// Missing files fall back to defaults; environment overrides apply last.
    pub fn load(path: Option<&Path>) -> SodaResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::candidates().into_iter().find(|p| p.is_file()) {
                Some(found) => Self::from_file(&found)?,
                None => Self::default(),
            },
        };
        Ok(config.apply_env())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("soda").join("config.toml"));
        }
        paths
    }

    fn from_file(path: &Path) -> SodaResult<Self> {
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `SODA_*` variables from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(domain) = lookup("SODA_DOMAIN") {
            self.domain = Some(domain);
        }
        if let Some(token) = lookup("SODA_APP_TOKEN") {
            self.auth.app_token = Some(token);
        }
        if let Some(username) = lookup("SODA_USERNAME") {
            self.auth.username = Some(username);
        }
        if let Some(password) = lookup("SODA_PASSWORD") {
            self.auth.password = Some(password);
        }
        if let Some(token) = lookup("SODA_ACCESS_TOKEN") {
            self.auth.access_token = Some(token);
        }
        self
    }
}

/// Builder for SodaConfig
#[derive(Debug, Default)]
pub struct SodaConfigBuilder {
    config: SodaConfig,
}

impl SodaConfigBuilder {
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = Some(domain.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn app_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth.app_token = Some(token.into());
        self
    }

    /// Basic auth credentials
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.auth.username = Some(username.into());
        self.config.auth.password = Some(password.into());
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth.access_token = Some(token.into());
        self
    }

    pub fn build(self) -> SodaConfig {
        self.config
    }
}
