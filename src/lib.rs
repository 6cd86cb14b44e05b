//! Workspace umbrella crate.
//!
//! Re-exports the individual workspace crates so host applications can depend
//! on `medley-workspace` alone, and provides the shared `tracing` setup used
//! by binaries and examples embedding the library.

pub use core_catalog as catalog;
pub use core_collections as collections;
pub use core_delivery as delivery;
pub use core_matcher as matcher;

pub mod logging {
    //! Structured logging setup built on `tracing-subscriber`.

    use tracing_subscriber::{filter::EnvFilter, fmt, util::SubscriberInitExt};

    /// Log output format
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LogFormat {
        /// Human-readable pretty format with colors
        Pretty,
        /// Compact format for production
        Compact,
        /// Structured JSON format for machine parsing
        Json,
    }

    impl Default for LogFormat {
        fn default() -> Self {
            #[cfg(debug_assertions)]
            return Self::Pretty;

            #[cfg(not(debug_assertions))]
            return Self::Compact;
        }
    }

    /// Logging configuration
    #[derive(Debug, Clone, Default)]
    pub struct LoggingConfig {
        /// Output format
        pub format: LogFormat,
        /// Custom filter string (e.g., "core_collections=debug,core_delivery=trace")
        pub filter: Option<String>,
    }

    impl LoggingConfig {
        pub fn with_format(mut self, format: LogFormat) -> Self {
            self.format = format;
            self
        }

        pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
            self.filter = Some(filter.into());
            self
        }
    }

    /// Initialize the logging system.
    ///
    /// Call once during application startup; subsequent calls fail because a
    /// global subscriber is already installed. `RUST_LOG` overrides the
    /// configured filter.
    pub fn init_logging(config: LoggingConfig) -> Result<(), String> {
        let default_filter = config.filter.unwrap_or_else(|| {
            "core_catalog=info,core_collections=info,core_matcher=info,core_delivery=info"
                .to_string()
        });
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&default_filter))
            .map_err(|e| format!("Invalid log filter: {e}"))?;

        let builder = fmt::fmt().with_env_filter(filter);
        let result = match config.format {
            LogFormat::Pretty => builder.pretty().finish().try_init(),
            LogFormat::Compact => builder.compact().finish().try_init(),
            LogFormat::Json => builder.json().finish().try_init(),
        };
        result.map_err(|e| format!("Failed to initialize logging: {e}"))
    }

}
