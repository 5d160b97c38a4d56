//! Logging utilities and configuration for cohort-bias.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary, which can use [`setup::init_logging`].

use tracing::Level;

/// Logging configuration for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for cohort-bias components
    pub base_level: Level,
    /// Whether to log the raw and normalized gender values seen
    pub log_value_details: bool,
    /// Whether to log data source operations
    pub log_data_operations: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_value_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_value_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production.
    ///
    /// Cell values are never logged, since uploads may carry patient data.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_value_details: false,
            log_data_operations: false,
            max_field_length: 128,
        }
    }

    /// Whether raw and normalized values should be logged.
    ///
    /// Requires both `log_value_details` and a base level of DEBUG or finer.
    pub fn value_details_enabled(&self) -> bool {
        self.log_value_details && self.base_level >= Level::DEBUG
    }

    /// Whether data source and column resolution events should be logged.
    pub fn data_operations_enabled(&self) -> bool {
        self.log_data_operations && self.base_level >= Level::INFO
    }
}

/// Macro for conditional data operation logging.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.data_operations_enabled() {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to the maximum field length if needed.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for binaries.
pub mod setup {
    use tracing::Level;

    /// Configuration for the process-wide subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for cohort-bias components specifically
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level for cohort-bias components.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                let crate_level = self.crate_level.as_str().to_lowercase();
                format!(
                    "{},cohort_bias={crate_level},cohort_bias_cli={crate_level}",
                    self.level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global subscriber writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the configured filter.
    ///
    /// ```rust,no_run
    /// use cohort_bias::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::setup::LoggingConfig;
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.base_level, Level::INFO);
        assert!(!config.log_value_details);
        assert!(config.log_data_operations);
        assert_eq!(config.max_field_length, 256);
    }

    #[test]
    fn test_log_config_production_hides_values() {
        let config = LogConfig::production();
        assert_eq!(config.base_level, Level::WARN);
        assert!(!config.log_value_details);
        assert!(!config.log_data_operations);
    }

    #[test]
    fn test_base_level_gates_logging() {
        assert!(LogConfig::verbose().value_details_enabled());
        assert!(!LogConfig::default().value_details_enabled());
        assert!(LogConfig::default().data_operations_enabled());

        let quiet = LogConfig {
            base_level: Level::WARN,
            ..LogConfig::verbose()
        };
        assert!(!quiet.value_details_enabled());
        assert!(!quiet.data_operations_enabled());

        let info_with_details = LogConfig {
            log_value_details: true,
            ..LogConfig::default()
        };
        assert!(!info_with_details.value_details_enabled());
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("this is a very long text that should be truncated", 10),
            "this is a ...(truncated)"
        );
        // never splits a multi-byte character
        assert_eq!(truncate_field("ééé", 3), "é...(truncated)");
    }

    #[test]
    fn test_env_filter() {
        let config = LoggingConfig::default().with_crate_level(Level::DEBUG);
        assert_eq!(
            config.env_filter(),
            "warn,cohort_bias=debug,cohort_bias_cli=debug"
        );
        let config = config.with_env_filter("trace");
        assert_eq!(config.env_filter(), "trace");
    }
}
