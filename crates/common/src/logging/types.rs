//! Configuration types for the logging subsystem.

use std::{path::PathBuf, time::Duration};

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

/// Stdout layer settings.
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    pub json_format: bool,
    /// Span lifecycle events to emit.
    pub fmt_span: FmtSpan,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            fmt_span: FmtSpan::CLOSE,
        }
    }
}

/// Rolling file output.
#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    pub directory: PathBuf,
    /// File name prefix, e.g. "podseq" -> "podseq.2026-01-01".
    pub file_name_prefix: String,
    pub rotation: Rotation,
    pub json_format: bool,
}

impl FileLoggingConfig {
    pub fn new(directory: PathBuf, file_name_prefix: String) -> Self {
        Self {
            directory,
            file_name_prefix,
            rotation: Rotation::DAILY,
            json_format: false,
        }
    }

    pub fn with_json_format(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }
}

/// OpenTelemetry resource attributes attached to exported spans.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub service_name: String,
    pub service_version: Option<String>,
    pub custom_attributes: Vec<KeyValue>,
}

impl ResourceConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            service_name,
            service_version: None,
            custom_attributes: Vec::new(),
        }
    }

    pub fn build_resource(&self) -> Resource {
        let mut attributes = vec![KeyValue::new("service.name", self.service_name.clone())];
        if let Some(version) = &self.service_version {
            attributes.push(KeyValue::new("service.version", version.clone()));
        }
        attributes.extend(self.custom_attributes.iter().cloned());
        Resource::new(attributes)
    }
}

/// Everything [`init`](super::init) needs to install the global subscriber.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub resource: ResourceConfig,
    /// OTLP collector endpoint. Span export is disabled when unset.
    pub otlp_url: Option<String>,
    pub otlp_timeout: Duration,
    pub stdout_config: StdoutConfig,
    pub file_logging_config: Option<FileLoggingConfig>,
}

impl LoggerConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            resource: ResourceConfig::new(service_name),
            otlp_url: None,
            otlp_timeout: Duration::from_secs(10),
            stdout_config: StdoutConfig::default(),
            file_logging_config: None,
        }
    }

    pub fn with_otlp_url(mut self, url: Option<String>) -> Self {
        self.otlp_url = url;
        self
    }

    pub fn with_service_version(mut self, version: String) -> Self {
        self.resource.service_version = Some(version);
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.stdout_config.json_format = enabled;
        self
    }

    pub fn with_file_logging(mut self, config: Option<FileLoggingConfig>) -> Self {
        self.file_logging_config = config;
        self
    }

    pub fn add_resource_attribute(mut self, key: &'static str, value: String) -> Self {
        self.resource
            .custom_attributes
            .push(KeyValue::new(key, value));
        self
    }
}
