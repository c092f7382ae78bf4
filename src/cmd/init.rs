//! `pokeproxy init`: generate a starter configuration file.
//!
//! Writes a documented YAML, JSON, or TOML template holding the default
//! upstream settings. Never overwrites an existing file.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::ProxyError;

pub fn execute(args: &InitArgs) -> Result<(), ProxyError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("pokeproxy.{}", args.format.extension())));

    if output.exists() {
        return Err(ProxyError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format))?;
    println!("Created {}", output.display());
    Ok(())
}

#[must_use]
pub const fn template(format: &ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Yaml => YAML_TEMPLATE,
        ConfigFormat::Json => JSON_TEMPLATE,
        ConfigFormat::Toml => TOML_TEMPLATE,
    }
}

const YAML_TEMPLATE: &str = r#"# pokeproxy config
#
# CLI flags and environment variables override these values:
#   --upstream-url / POKEAPI_BASE_URL
#   --timeout      / REQUEST_TIMEOUT_MS

upstream:
  base_url: "https://pokeapi.co/api/v2"   # Every /api/v2 path is appended here
  timeout: 5000                          # Upstream call timeout in ms
"#;

const JSON_TEMPLATE: &str = r#"{
  "upstream": {
    "base_url": "https://pokeapi.co/api/v2",
    "timeout": 5000
  }
}
"#;

const TOML_TEMPLATE: &str = r#"# pokeproxy config
#
# CLI flags and environment variables override these values:
#   --upstream-url / POKEAPI_BASE_URL
#   --timeout      / REQUEST_TIMEOUT_MS

[upstream]
base_url = "https://pokeapi.co/api/v2"
timeout = 5000
"#;
