//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogFormat, LogOutput, LoggingConfig, RippleConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &RippleConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File {
        match &logging.file_path {
            None => return Err(ConfigError::missing_field("logging.file_path")),
            Some(path) if path.file_name().is_none() => {
                return Err(ConfigError::validation(format!(
                    "Log file path has no file name: {}",
                    path.display()
                )));
            }
            Some(_) => {}
        }
    }

    if logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        return Err(ConfigError::validation(
            "JSON log format requires the `json-log` feature",
        ));
    }

    for target in logging.filters.keys() {
        validate_filter_target(target)?;
    }

    Ok(())
}

/// Validates the target of a per-module level override.
fn validate_filter_target(target: &str) -> ConfigResult<()> {
    if target.trim().is_empty() {
        return Err(ConfigError::validation("Log filter target cannot be empty"));
    }

    if target.contains(['=', ',', ' ']) {
        return Err(ConfigError::validation(format!(
            "Log filter target cannot contain '=', ',' or spaces: {target}"
        )));
    }

    Ok(())
}
