//! Console logging setup.
//!
//! The engine only emits `tracing` events; installing a subscriber is the
//! orchestration layer's call. This helper wires one up from
//! [`LoggingConfig`](crate::config::LoggingConfig).
//!
//! `RUST_LOG` takes precedence over the configured level when set.
//!
//! # Usage
//!
//! ```rust,ignore
//! use comdirect_session::{config::load_config, telemetry::init_logging};
//!
//! let config = load_config(None)?;
//! init_logging(&config.observability.logging)?;
//! ```

use thiserror::Error;
use tracing_subscriber::{EnvFilter, util::TryInitError};

use crate::config::LoggingConfig;

/// Logging initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Build the filter: `RUST_LOG` if present, else the configured level.
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidFilter {
        directive: config.level.clone(),
        message: e.to_string(),
    })
}

/// Install a console subscriber.
///
/// `format = "json"` emits one JSON object per event; anything else uses
/// the human-readable formatter.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    tracing::debug!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
