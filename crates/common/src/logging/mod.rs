//! Tracing subscriber setup with optional OpenTelemetry export.

mod manager;
mod types;


pub use manager::{finalize, init, LoggingError};
pub use tracing_appender::rolling::Rotation;
pub use types::{FileLoggingConfig, LoggerConfig, ResourceConfig, StdoutConfig};

/// Service name with an optional instance label, e.g. `podseq%node-1`.
pub fn format_service_name(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
