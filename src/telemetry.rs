//! Tracing subscriber setup: pretty or JSON stdout, optional log file, optional OTLP export.

use std::sync::Mutex;

use error_stack::ResultExt;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace as sdktrace, Resource};
use thiserror::Error;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    filter::Targets, layer::Layered, layer::SubscriberExt, util::SubscriberInitExt, Layer,
    Registry,
};

use crate::adapters::config::telemetry_config::TelemetryConfig;
use crate::prettyprint::PrettyFormatter;

pub const SERVICE_NAME: &str = "license_approval";

type FilteredRegistry = Layered<Targets, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to create the log file")]
    LogFile,
    #[error("Failed to install the OTLP exporter")]
    Exporter,
    #[error("A global tracing subscriber is already installed")]
    Subscriber,
}

fn targets(config: &TelemetryConfig) -> Targets {
    Targets::new()
        .with_target(SERVICE_NAME, config.level())
        .with_default(tracing::Level::WARN)
}

fn otlp_layer(endpoint: &str) -> error_stack::Result<BoxedLayer, TelemetryError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", SERVICE_NAME),
        ])))
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .change_context(TelemetryError::Exporter)
        .attach_printable_lazy(|| format!("Endpoint: {endpoint}"))?;

    Ok(OpenTelemetryLayer::new(tracer).boxed())
}

/// Installs the global subscriber. Must run inside the tokio runtime when OTLP is enabled.
pub fn init(config: &TelemetryConfig) -> error_stack::Result<(), TelemetryError> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if let Some(endpoint) = &config.otlp_endpoint {
        layers.push(otlp_layer(endpoint)?);
    }

    if let Some(path) = &config.log_file {
        let file = std::fs::File::create(path)
            .change_context(TelemetryError::LogFile)
            .attach_printable_lazy(|| format!("Path: {path}"))?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(false))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .boxed(),
        );
    }

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .event_format(PrettyFormatter::new(true))
            .boxed()
    };
    layers.push(stdout_layer);

    Registry::default()
        .with(targets(config))
        .with(layers)
        .try_init()
        .change_context(TelemetryError::Subscriber)
}
