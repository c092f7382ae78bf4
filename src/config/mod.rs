//! Configuration loading and validation.
//!
//! Defines the [`ConfigSource`] trait for pluggable config files, and
//! [`resolve`] which merges an optional file with CLI / environment
//! overrides into the [`UpstreamSettings`] the proxy runs with. The result
//! is loaded once at startup and never changes afterwards.

pub mod model;
pub mod sources;
pub mod validation;

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::ProxyError;
use model::Config;

// async_trait is required here because ConfigSource is used as Box<dyn ConfigSource>
// and native async fn in traits (Rust 1.75+) does not support dyn dispatch.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<Config, ProxyError>;
}

/// Values given on the command line or through the environment. Each one
/// wins over the config file when present.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// Validated upstream settings shared by every request.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: Url,
    pub timeout: Duration,
}

impl UpstreamSettings {
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Load the config (from `source`, or built-in defaults), apply
/// `overrides`, validate the result and parse the base URL.
pub async fn resolve(
    source: Option<&dyn ConfigSource>,
    overrides: &Overrides,
) -> Result<UpstreamSettings, ProxyError> {
    let mut config = match source {
        Some(source) => {
            let config = source.load().await?;
            tracing::info!(source = source.name(), "config loaded");
            config
        }
        None => Config::default(),
    };

    if let Some(ref base_url) = overrides.base_url {
        config.upstream.base_url.clone_from(base_url);
    }
    if let Some(timeout) = overrides.timeout_ms {
        config.upstream.timeout = timeout;
    }

    settings_from(&config)
}

/// Validate a [`Config`] and turn it into [`UpstreamSettings`].
pub fn settings_from(config: &Config) -> Result<UpstreamSettings, ProxyError> {
    if let Err(errors) = validation::validate(config) {
        return Err(ProxyError::ConfigValidation { errors });
    }

    let base_url = Url::parse(&config.upstream.base_url).map_err(|e| ProxyError::UriParse {
        source: Box::new(e),
    })?;

    Ok(UpstreamSettings {
        base_url,
        timeout: Duration::from_millis(config.upstream.timeout),
    })
}
