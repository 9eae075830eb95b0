//! Logger initialisation.
//!
//! Everything in the crate logs through the `log` facade; this sets up
//! `env_logger` as the backend for the binary.

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "trifield=debug,wgpu=warn"). When unset, `RUST_LOG` is read, then the
/// default applies: info for this crate, warn for the GPU stack.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

static INIT: Once = Once::new();

/// Initialise the global logger once. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let filter = config
            .env_filter
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        // Another logger may already be installed (tests, embedding apps).
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized with filter {filter:?}");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging(LoggingConfig::default().with_filter("warn"));
        init_logging(LoggingConfig::default());
        assert!(INIT.is_completed());
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert!(config.env_filter.is_none());
        assert_eq!(
            LoggingConfig::default().with_filter("debug").env_filter.as_deref(),
            Some("debug")
        );
    }
}
