//! Observability wiring.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` (`RUST_LOG`,
//! default `info`), a JSON or pretty fmt layer writing to stderr, and, when an
//! OTLP endpoint is configured, an OpenTelemetry export layer. Every span and
//! event emitted by the workspace crates flows through this registry.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{AppConfig, LogFormat};

/// Flushes and shuts down the span exporter when dropped.
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {err}");
            }
        }
    }
}

/// The event formatter selected by `format`, writing to `writer`.
fn fmt_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(writer).boxed(),
    }
}

/// Installs the global subscriber. Must be called from within the tokio
/// runtime when OTLP export is enabled.
pub fn init(config: &AppConfig) -> anyhow::Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = match &config.otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()?;
            Some(
                TracerProvider::builder()
                    .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
                    .build(),
            )
        }
        None => None,
    };
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.app_name.clone()))
    });

    tracing_subscriber::registry()
        .with(fmt_layer(config.log_format, std::io::stderr))
        .with(otel_layer)
        .with(filter)
        .try_init()?;

    Ok(TelemetryGuard { provider })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// In-memory log sink shared between the layer and the test.
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Sink {
        type Writer = Sink;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn emit(format: LogFormat) -> String {
        let sink = Sink::default();
        let subscriber = tracing_subscriber::registry()
            .with(fmt_layer(format, sink.clone()))
            .with(EnvFilter::new("info"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(endpoint = "/auth/login", "invocation succeeded");
            tracing::debug!("below the filter");
        });
        sink.text()
    }

    #[test]
    fn json_format_writes_one_object_per_event() {
        let output = emit(LogFormat::Json);

        let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines.len(), 1, "{output}");
        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["message"], "invocation succeeded");
        assert_eq!(event["fields"]["endpoint"], "/auth/login");
    }

    #[test]
    fn pretty_format_is_not_json() {
        let output = emit(LogFormat::Pretty);

        assert!(output.contains("invocation succeeded"), "{output}");
        assert!(output.contains("/auth/login"), "{output}");
        assert!(!output.contains("below the filter"), "{output}");
        let first = output.lines().next().unwrap_or_default();
        assert!(serde_json::from_str::<serde_json::Value>(first).is_err(), "{output}");
    }
}
