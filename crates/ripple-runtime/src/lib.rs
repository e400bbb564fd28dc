//! Ripple Runtime - Application setup for the Ripple event system.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `RippleConfig`)
//! - Configuration validation (`validate_config`)
//! - Logging configuration (`LoggingBuilder`, `SpanEvents`)
//!
//! # Feature Flags
//!
//! - `toml-config`: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output
//!
//! ```rust,ignore
//! use ripple_runtime::{ConfigLoader, validate_config};
//!
//! let config = ConfigLoader::new().load()?;
//! validate_config(&config)?;
//! ripple_runtime::logging::init_from_config(&config.logging);
//! ```

pub mod config;
pub mod logging;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, Profile, RippleConfig,
    validate_config,
};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, span, trace, warn};
}
