//! Logging, tracing and metrics bootstrap
//!
//! jrpc logs through the [`tracing`] crate. Applications call
//! [`init_observability`] once at startup to install a subscriber and,
//! optionally, OpenTelemetry exporters that ship spans and metrics to an OTLP
//! collector over gRPC.
//!
//! # Stdio transports
//!
//! When JSON-RPC runs over stdin/stdout, anything else written to stdout
//! corrupts the stream. Log output therefore goes to **stderr** by default;
//! see [`ObservabilityConfig::with_stderr`].
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector endpoint
//! - `RUST_LOG`: log filter directives (takes precedence over the configured level)
//!
//! # Examples
//!
//! ```rust,no_run
//! use jrpc_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("calculator")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_level("debug");
//!
//!     // Providers are flushed and shut down when the guard is dropped
//!     let _guard = jrpc_core::init_observability(config).expect("observability");
//!
//!     tracing::info!("ready");
//! }
//! ```

use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::time::Duration;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Observability configuration
///
/// Defaults:
/// - service name "jrpc", version from Cargo
/// - endpoint from `OTEL_EXPORTER_OTLP_ENDPOINT`, else `http://localhost:4317`
/// - traces and metrics export disabled
/// - level from `RUST_LOG`, else "info"
/// - plain text output on stderr
///
/// ```rust
/// use jrpc_core::ObservabilityConfig;
///
/// let config = ObservabilityConfig::new("language-server")
///     .with_traces(true)
///     .with_json(true)
///     .with_log_level("debug");
/// assert!(config.enable_traces);
/// assert!(config.stderr);
/// ```
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to exported telemetry
    pub service_name: String,
    pub service_version: String,
    /// OTLP gRPC endpoint
    pub otlp_endpoint: String,
    /// Export spans over OTLP
    pub enable_traces: bool,
    /// Export metrics over OTLP
    pub enable_metrics: bool,
    /// Filter directives used when `RUST_LOG` is unset
    pub log_level: String,
    /// Format log lines as JSON
    pub json: bool,
    /// Write logs to stderr instead of stdout
    pub stderr: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "jrpc".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: false,
            enable_metrics: false,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json: false,
            stderr: true,
        }
    }
}

impl ObservabilityConfig {
    /// Create a configuration for the named service
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the log filter ("error", "warn", "info", "debug", "trace" or directives)
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metrics export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Emit JSON log lines
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Route log output to stderr (`true`) or stdout (`false`)
    pub fn with_stderr(mut self, stderr: bool) -> Self {
        self.stderr = stderr;
        self
    }

    fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }

    fn writer(&self) -> BoxMakeWriter {
        if self.stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::stdout)
        }
    }
}

/// Keeps the telemetry providers alive
///
/// Dropping the guard flushes pending spans and metrics and shuts the
/// providers down.
#[must_use = "telemetry is shut down when the guard is dropped"]
pub struct ObservabilityGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl ObservabilityGuard {
    pub fn traces_enabled(&self) -> bool {
        self.tracer_provider.is_some()
    }

    pub fn metrics_enabled(&self) -> bool {
        self.meter_provider.is_some()
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {}", e);
            }
        }
        if let Some(provider) = self.meter_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down meter provider: {}", e);
            }
        }
    }
}

/// Install the tracing subscriber and the enabled OTLP exporters
///
/// Call once per process. Exporters are created lazily and must be
/// initialized inside a tokio runtime.
///
/// # Errors
///
/// Fails if an exporter cannot be built, the filter directives are invalid,
/// or a global subscriber is already installed.
pub fn init_observability(config: ObservabilityConfig) -> Result<ObservabilityGuard, BoxError> {
    let tracer_provider = if config.enable_traces {
        Some(init_tracer_provider(&config)?)
    } else {
        None
    };

    let meter_provider = if config.enable_metrics {
        Some(init_meter_provider(&config)?)
    } else {
        None
    };

    init_subscriber(&config, tracer_provider.as_ref())?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        "Observability initialized"
    );

    Ok(ObservabilityGuard {
        tracer_provider,
        meter_provider,
    })
}

fn init_tracer_provider(config: &ObservabilityConfig) -> Result<SdkTracerProvider, BoxError> {
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

fn init_meter_provider(config: &ObservabilityConfig) -> Result<SdkMeterProvider, BoxError> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(30))
        .build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    global::set_meter_provider(provider.clone());
    Ok(provider)
}

fn init_subscriber(
    config: &ObservabilityConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), BoxError> {
    use opentelemetry::trace::TracerProvider as _;

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let telemetry_layer = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_line_number(true)
            .with_writer(config.writer())
    });

    let text_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(config.writer())
    });

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "jrpc");
        assert!(!config.enable_traces);
        assert!(!config.enable_metrics);
        assert!(config.stderr);
        assert!(!config.json);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ObservabilityConfig::new("test-service")
            .with_endpoint("http://collector:4317")
            .with_log_level("debug")
            .with_version("2.0.0")
            .with_traces(true)
            .with_metrics(true)
            .with_json(true)
            .with_stderr(false);

        assert_eq!(config.service_name, "test-service");
        assert_eq!(config.otlp_endpoint, "http://collector:4317");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.service_version, "2.0.0");
        assert!(config.enable_traces);
        assert!(config.enable_metrics);
        assert!(config.json);
        assert!(!config.stderr);
    }

    #[test]
    fn test_init_without_exporters() {
        let config = ObservabilityConfig::new("test-local").with_log_level("warn");
        let guard = init_observability(config).unwrap();
        assert!(!guard.traces_enabled());
        assert!(!guard.metrics_enabled());

        // A second global subscriber is refused
        assert!(init_observability(ObservabilityConfig::default()).is_err());
    }
}
