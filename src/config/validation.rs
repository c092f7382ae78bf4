//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for an unusable
//! upstream base URL or timeout and returns a list of [`ValidationError`]
//! values with per-field suggestions.

use serde::Serialize;
use url::Url;

use super::model::Config;
use crate::error::ValidationError;

pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Validate the upstream base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_base_url(url: &str) -> Result<(), String> {
    let Ok(parsed) = Url::parse(url) else {
        return Err(format!("'{url}' is not a valid URL"));
    };

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(format!(
            "unsupported scheme '{scheme}' (expected http or https)"
        ));
    }
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(format!("'{url}' has no host"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err("base URL must not carry a query string or fragment".into());
    }
    Ok(())
}

/// Validate the upstream timeout. Returns `Ok(())` or a human-readable error.
pub fn validate_timeout(timeout_ms: u64) -> Result<(), String> {
    if timeout_ms == 0 {
        return Err("timeout must be greater than 0".into());
    }
    if timeout_ms > MAX_TIMEOUT_MS {
        return Err(format!(
            "timeout of {timeout_ms}ms exceeds the {MAX_TIMEOUT_MS}ms maximum"
        ));
    }
    Ok(())
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let upstream = &config.upstream;

    if let Err(msg) = validate_base_url(&upstream.base_url) {
        let suggestion = if upstream.base_url.contains("://") {
            None
        } else {
            Some(format!("did you mean 'https://{}'?", upstream.base_url))
        };
        errors.push(ValidationError {
            field: "upstream.base_url".into(),
            message: msg,
            suggestion,
        });
    }

    if let Err(msg) = validate_timeout(upstream.timeout) {
        errors.push(ValidationError {
            field: "upstream.timeout".into(),
            message: msg,
            suggestion: Some("typical values are 1000-10000 (milliseconds)".into()),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Outcome of validating one config file.
///
/// `Display` renders the human-readable report and `Serialize` the JSON one,
/// so both `validate` output formats carry the same facts.
#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    pub path: &'a str,
    pub valid: bool,
    pub upstream: &'a str,
    pub timeout_ms: u64,
    pub errors: Vec<ValidationError>,
}

impl<'a> ValidationReport<'a> {
    #[must_use]
    pub fn new(path: &'a str, config: &'a Config) -> Self {
        let errors = validate(config).err().unwrap_or_default();
        Self {
            path,
            valid: errors.is_empty(),
            upstream: &config.upstream.base_url,
            timeout_ms: config.upstream.timeout,
            errors,
        }
    }
}

impl std::fmt::Display for ValidationReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.valid {
            return write!(
                f,
                "\u{2713} {} is valid\n  upstream: {}\n  timeout:  {}ms",
                self.path, self.upstream, self.timeout_ms
            );
        }
        writeln!(f, "\u{2717} {} has {} errors", self.path, self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n{error}")?;
        }
        Ok(())
    }
}
