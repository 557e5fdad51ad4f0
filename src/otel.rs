use anyhow::anyhow;
use opentelemetry::global;
use opentelemetry::metrics::Meter;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::{BatchLogProcessor, SdkLoggerProvider};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::trace::{BatchSpanProcessor, SdkTracerProvider};
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;

const STDOUT_EXPORT_VAR: &str = "TRIP_PLANNER_OTEL_STDOUT";

/// Initialize tracing and OpenTelemetry, returning a guard that flushes on drop
pub fn init_otel() -> Result<OtelGuard, anyhow::Error> {
    let providers = OtelProviders::init(Exporter::from_env())?;
    Ok(OtelGuard { providers })
}

/// Creates or returns metric generator
pub fn get_meter() -> &'static Meter {
    static METER: OnceLock<Meter> = OnceLock::new();
    METER.get_or_init(|| global::meter(get_service().as_str()))
}

/// Guard that ensures OpenTelemetry providers are properly shut down
pub struct OtelGuard {
    providers: OtelProviders,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Err(e) = self.providers.shutdown() {
            eprintln!("Error during OpenTelemetry shutdown: {}", e);
        }
    }
}

/// Where telemetry signals are sent.
///
/// Stdout export is opt-in because the itinerary itself is written to stdout.
#[derive(Debug, Clone, PartialEq)]
enum Exporter {
    Otlp(String),
    Stdout,
    Disabled,
}

impl Exporter {
    fn from_env() -> Self {
        Self::select(
            env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            env::var(STDOUT_EXPORT_VAR).is_ok(),
        )
    }

    fn select(otlp_endpoint: Option<String>, stdout_requested: bool) -> Self {
        match otlp_endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => Exporter::Otlp(endpoint),
            _ if stdout_requested => Exporter::Stdout,
            _ => Exporter::Disabled,
        }
    }
}

struct OtelProviders {
    log_provider: SdkLoggerProvider,
    trace_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl OtelProviders {
    fn init(exporter: Exporter) -> Result<OtelProviders, anyhow::Error> {
        let log_provider = init_logs(&exporter)?;

        let otel_filter = EnvFilter::new("info")
            .add_directive("hyper=off".parse()?)
            .add_directive("tonic=off".parse()?)
            .add_directive("rig=off".parse()?)
            .add_directive("reqwest=off".parse()?)
            .add_directive("html5ever=off".parse()?);
        let log_layer = OpenTelemetryTracingBridge::new(&log_provider).with_filter(otel_filter);

        // Human-readable logs go to stderr; RUST_LOG overrides the default level
        let fmt_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(fmt_filter);

        let trace_provider = init_traces(&exporter)?;
        let tracing_layer = OpenTelemetryLayer::new(trace_provider.tracer(get_service().as_str()))
            .with_filter(EnvFilter::new("info").add_directive("opentelemetry=info".parse()?));

        let subscriber = tracing_subscriber::registry()
            .with(log_layer)
            .with(tracing_layer)
            .with(fmt_layer);
        subscriber::set_global_default(subscriber)?;

        let meter_provider = init_metrics(&exporter)?;

        Ok(OtelProviders {
            log_provider,
            trace_provider,
            meter_provider,
        })
    }

    fn shutdown(&self) -> Result<(), anyhow::Error> {
        let mut shutdown_errors = Vec::new();
        if let Err(e) = self.log_provider.shutdown() {
            shutdown_errors.push(format!("log provider: {}", e));
        }
        if let Err(e) = self.trace_provider.shutdown() {
            shutdown_errors.push(format!("trace provider: {}", e));
        }
        if let Err(e) = self.meter_provider.shutdown() {
            shutdown_errors.push(format!("meter provider: {}", e));
        }
        if !shutdown_errors.is_empty() {
            return Err(anyhow!(
                "Failed to shutdown providers: {}",
                shutdown_errors.join("; ")
            ));
        }
        Ok(())
    }
}

fn get_service() -> &'static String {
    static SERVICE: OnceLock<String> = OnceLock::new();
    SERVICE.get_or_init(|| env::var("OTEL_SERVICE_NAME").unwrap_or("trip-planner".to_owned()))
}

fn get_resource() -> Resource {
    static RESOURCE: OnceLock<Resource> = OnceLock::new();
    RESOURCE
        .get_or_init(|| {
            Resource::builder()
                .with_service_name(get_service().as_str())
                .build()
        })
        .clone()
}

fn init_traces(exporter: &Exporter) -> Result<SdkTracerProvider, anyhow::Error> {
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(BaggagePropagator::new()),
        Box::new(TraceContextPropagator::new()),
    ]));

    let batch_config = || {
        opentelemetry_sdk::trace::BatchConfigBuilder::default()
            .with_max_queue_size(1000)
            .with_scheduled_delay(Duration::from_secs(1))
            .with_max_export_batch_size(100)
            .build()
    };
    let builder = SdkTracerProvider::builder().with_resource(get_resource());
    let provider = match exporter {
        Exporter::Otlp(endpoint) => {
            let span_exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()?;
            builder
                .with_span_processor(BatchSpanProcessor::new(span_exporter, batch_config()))
                .build()
        }
        Exporter::Stdout => builder
            .with_span_processor(BatchSpanProcessor::new(
                opentelemetry_stdout::SpanExporter::default(),
                batch_config(),
            ))
            .build(),
        Exporter::Disabled => builder.build(),
    };

    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

fn init_metrics(exporter: &Exporter) -> Result<SdkMeterProvider, anyhow::Error> {
    let builder = SdkMeterProvider::builder().with_resource(get_resource());
    let provider = match exporter {
        Exporter::Otlp(endpoint) => {
            let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()?;
            builder
                .with_reader(
                    PeriodicReader::builder(metric_exporter)
                        .with_interval(Duration::from_secs(1))
                        .build(),
                )
                .build()
        }
        Exporter::Stdout => builder
            .with_reader(
                PeriodicReader::builder(opentelemetry_stdout::MetricExporter::builder().build())
                    .with_interval(Duration::from_secs(1))
                    .build(),
            )
            .build(),
        Exporter::Disabled => builder.build(),
    };
    global::set_meter_provider(provider.clone());
    Ok(provider)
}

fn init_logs(exporter: &Exporter) -> Result<SdkLoggerProvider, anyhow::Error> {
    let builder = SdkLoggerProvider::builder().with_resource(get_resource());
    let provider = match exporter {
        Exporter::Otlp(endpoint) => {
            let log_exporter = opentelemetry_otlp::LogExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()?;
            builder
                .with_log_processor(BatchLogProcessor::builder(log_exporter).build())
                .build()
        }
        Exporter::Stdout => builder
            .with_log_processor(
                BatchLogProcessor::builder(opentelemetry_stdout::LogExporter::default()).build(),
            )
            .build(),
        Exporter::Disabled => builder.build(),
    };
    Ok(provider)
}
