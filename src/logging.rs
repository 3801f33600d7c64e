//! Logging configuration and payload logging helpers.
//!
//! The crate itself only emits `tracing` events; installing a subscriber is
//! left to the application, which can use [`LoggingConfig`] for a ready-made
//! `tracing-subscriber` setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log level.
pub const LOG_LEVEL_ENV: &str = "BEDROCK_LOG_LEVEL";

/// Environment variable holding the log format.
pub const LOG_FORMAT_ENV: &str = "BEDROCK_LOG_FORMAT";

/// Longest payload excerpt written to debug logs.
const MAX_LOGGED_PAYLOAD: usize = 1000;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The minimum log level to capture
    pub level: LogLevel,
    /// The output format for log messages
    pub format: LogFormat,
    /// Whether to include the module target in log output
    pub include_target: bool,
    /// Whether to include file and line number in log output
    pub include_file_line: bool,
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (includes payload excerpts)
    Trace,
    /// Debug-level logging
    Debug,
    /// Info-level logging
    Info,
    /// Warning-level logging
    Warn,
    /// Error-level logging
    Error,
}

impl LogLevel {
    /// Parse a level name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl From<LogLevel> for tracing::level_filters::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format for structured log collection
    Json,
    /// Compact single-line format
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_target: true,
            include_file_line: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `BEDROCK_LOG_LEVEL` and `BEDROCK_LOG_FORMAT`.
    ///
    /// Unknown or missing values keep the defaults (`info`, pretty).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(level) = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .as_deref()
            .and_then(LogLevel::parse)
        {
            config.level = level;
        }
        if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
            config.format = match format.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        config
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether to include the module target.
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Sets whether to include file and line number.
    pub fn with_file_line(mut self, include: bool) -> Self {
        self.include_file_line = include;
        self
    }

    /// `RUST_LOG` directives plus this config's level as the default.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::from_default_env()
            .add_directive(tracing::level_filters::LevelFilter::from(self.level).into())
    }

    /// Initialize a global subscriber with this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber has already been installed.
    pub fn init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = self.env_filter();

        match self.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        fmt::layer()
                            .with_target(self.include_target)
                            .with_file(self.include_file_line)
                            .with_line_number(self.include_file_line),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init()?;
            }
            LogFormat::Compact => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init()?;
            }
        }

        Ok(())
    }
}

/// Log an outgoing provider payload at trace level.
pub fn log_request_payload(model_id: &str, operation: &str, body: &[u8]) {
    tracing::trace!(
        model_id = model_id,
        operation = operation,
        bytes = body.len(),
        body = %excerpt(body),
        "Outgoing payload"
    );
}

/// Log an incoming provider payload at trace level.
pub fn log_response_payload(model_id: &str, operation: &str, body: &[u8]) {
    tracing::trace!(
        model_id = model_id,
        operation = operation,
        bytes = body.len(),
        body = %excerpt(body),
        "Incoming payload"
    );
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.chars().count() <= MAX_LOGGED_PAYLOAD {
        return text.into_owned();
    }
    let mut out: String = text.chars().take(MAX_LOGGED_PAYLOAD).collect();
    out.push_str("...");
    out
}
