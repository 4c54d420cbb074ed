//! Installs and tears down the global tracing subscriber.

use std::sync::OnceLock;

use opentelemetry::{
    global::{self, set_text_map_propagator},
    trace::TracerProvider,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    runtime::Tokio,
    trace::{Config, TracerProvider as SdkTracerProvider},
};
use thiserror::Error;
use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::types::LoggerConfig;

/// Kept so [`finalize`] can flush batched spans.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("otlp pipeline: {0}")]
    Otlp(String),

    #[error("subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Installs stdout, optional rolling-file and optional OTLP layers.
///
/// Must be called from within a tokio runtime context when OTLP export is enabled.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    set_text_map_propagator(TraceContextPropagator::new());

    let filt = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let stdout_layer = if config.stdout_config.json_format {
        layer()
            .json()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    let file_layer = config.file_logging_config.as_ref().map(|file_config| {
        let appender = RollingFileAppender::new(
            file_config.rotation.clone(),
            &file_config.directory,
            &file_config.file_name_prefix,
        );

        if file_config.json_format {
            layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        }
    });

    let otel_layer = match config.otlp_url.as_ref() {
        Some(url) => {
            let trace_config = Config::default().with_resource(config.resource.build_resource());
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(url)
                .with_timeout(config.otlp_timeout);

            let provider = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(trace_config)
                .install_batch(Tokio)
                .map_err(|e| LoggingError::Otlp(e.to_string()))?;

            if TRACER_PROVIDER.set(provider.clone()).is_err() {
                warn!("tracer provider already set, keeping the first one");
            }

            let tracer = provider.tracer("podseq-tracer");
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))?;

    info!(
        service_name = %config.resource.service_name,
        service_version = ?config.resource.service_version,
        otlp = config.otlp_url.is_some(),
        "logging initialized"
    );
    Ok(())
}

/// Flushes pending spans and shuts the exporter down.
pub fn finalize() {
    info!("shutting down logging");

    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            error!(err = ?e, "failed to shut down tracer provider");
        }
    }

    global::shutdown_tracer_provider();
}
