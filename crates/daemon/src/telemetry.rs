//! Logging and optional OpenTelemetry export
//!
//! - `RUST_LOG` overrides the default `trendline=info` filter
//! - `log_format`: `json` for production, `pretty` otherwise
//! - `log_dir`: adds a daily-rotated JSON file log
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP trace export (feature `telemetry`)

use crate::config::LogFormat;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "trendline=info";
const LOG_FILE_PREFIX: &str = "trendline.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps background writers and exporters alive; flush happens on drop
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
    #[cfg(feature = "telemetry")]
    tracer_provider: Option<opentelemetry_sdk::trace::TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        #[cfg(feature = "telemetry")]
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("OpenTelemetry shutdown failed: {e}");
            }
        }
    }
}

pub fn init(format: LogFormat, log_dir: Option<&str>) -> Result<TelemetryGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(match format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    });

    let file_guard = match log_dir {
        Some(dir) => {
            let dir = shellexpand::tilde(dir).into_owned();
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    #[cfg(feature = "telemetry")]
    let tracer_provider = match otel::layer()? {
        Some((layer, provider)) => {
            layers.push(layer);
            Some(provider)
        }
        None => None,
    };

    #[cfg(not(feature = "telemetry"))]
    let otel_requested = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok();

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    #[cfg(not(feature = "telemetry"))]
    if otel_requested {
        tracing::warn!("OTEL_EXPORTER_OTLP_ENDPOINT is set but the 'telemetry' feature is not enabled");
    }

    Ok(TelemetryGuard {
        _file_guard: file_guard,
        #[cfg(feature = "telemetry")]
        tracer_provider,
    })
}

#[cfg(feature = "telemetry")]
mod otel {
    use super::BoxedLayer;
    use anyhow::Result;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use opentelemetry_sdk::{runtime, Resource};
    use tracing_subscriber::Layer;

    const DEFAULT_SERVICE_NAME: &str = "trendline-daemon";

    /// OTLP layer when `OTEL_EXPORTER_OTLP_ENDPOINT` is set
    pub fn layer() -> Result<Option<(BoxedLayer, TracerProvider)>> {
        let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
            return Ok(None);
        };
        let service_name = std::env::var("OTEL_SERVICE_NAME")
            .unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_resource(Resource::new(vec![KeyValue::new(
                "service.name",
                service_name.clone(),
            )]))
            .build();

        let tracer = provider.tracer(service_name);
        let layer = tracing_opentelemetry::layer().with_tracer(tracer).boxed();
        Ok(Some((layer, provider)))
    }
}
