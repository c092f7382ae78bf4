//! `pokeproxy validate`: check a configuration file for errors.
//!
//! Parses the file and prints a [`ValidationReport`] as text or JSON. An
//! invalid file still prints its full report before the command fails.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::sources::parse_config_str;
use crate::config::validation::ValidationReport;
use crate::error::ProxyError;

pub fn execute(args: &ValidateArgs) -> Result<(), ProxyError> {
    let path = &args.config;
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ProxyError::ConfigFileNotFound { path: path.clone() },
        _ => ProxyError::Io(e),
    })?;

    let display = path.display().to_string();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &display)?;
    let report = ValidationReport::new(&display, &config);

    match (&args.format, report.valid) {
        (ValidateFormat::Json, _) => {
            println!("{}", serde_json::to_string(&report).unwrap_or_default());
        }
        (ValidateFormat::Text, true) => println!("{report}"),
        (ValidateFormat::Text, false) => eprintln!("{report}"),
    }

    if report.valid {
        Ok(())
    } else {
        Err(ProxyError::ConfigValidation {
            errors: report.errors,
        })
    }
}
