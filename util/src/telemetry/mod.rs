//! Defines helpers for logging and telemetry

use std::{error::Error, fmt::Display};

pub use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt,
    fmt::format::Format,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::err_str;

/// Possible errors that occur when setting up telemetry for the gateway
#[derive(Debug)]
pub enum TelemetrySetupError {
    /// Error emitted when a global subscriber has already been installed
    AlreadyInitialized(String),
}

impl Error for TelemetrySetupError {}
impl Display for TelemetrySetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Initialize a logger at the given log level
pub fn setup_system_logger(level: LevelFilter) {
    tracing_subscriber::fmt().event_format(Format::default().pretty()).with_max_level(level).init();
}

/// A builder for configuring telemetry for the gateway
pub struct TelemetryBuilder {
    /// The subscriber layers to add to the telemetry stack
    layers: Vec<Box<dyn Layer<Registry> + Send + Sync + 'static>>,
    /// The default level applied when `RUST_LOG` does not override it
    default_level: LevelFilter,
}

impl Default for TelemetryBuilder {
    fn default() -> Self {
        Self { layers: Vec::new(), default_level: LevelFilter::INFO }
    }
}

impl TelemetryBuilder {
    /// Add a subscriber layer to the telemetry builder
    fn with_layer<L: Layer<Registry> + Send + Sync>(mut self, layer: L) -> Self {
        self.layers.push(layer.boxed());
        self
    }

    /// Set the default level of the environment filter
    pub fn with_default_level(mut self, level: LevelFilter) -> Self {
        self.default_level = level;
        self
    }

    /// Configure logging for the gateway
    pub fn with_logging(self, json_logs: bool) -> Self {
        if json_logs {
            self.with_layer(fmt::layer().json().with_current_span(true))
        } else {
            self.with_layer(fmt::layer().pretty())
        }
    }

    /// Build the environment filter applied across all layers
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder().with_default_directive(self.default_level.into()).from_env_lossy()
    }

    /// Initialize the global subscriber with the configured telemetry layers
    pub fn build(self) -> Result<(), TelemetrySetupError> {
        let filter = self.env_filter();
        let layers = self.layers.with_filter(filter);
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(err_str!(TelemetrySetupError::AlreadyInitialized))
    }
}

/// Configures logging for the gateway
pub fn configure_telemetry(debug: bool, json_logs: bool) -> Result<(), TelemetrySetupError> {
    let level = if debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
    TelemetryBuilder::default().with_default_level(level).with_logging(json_logs).build()
}

#[cfg(test)]
mod test {
    use super::*;

    /// Tests that a second global subscriber is rejected rather than panicking
    #[test]
    fn test_double_init() {
        let first = configure_telemetry(false /* debug */, true /* json_logs */);
        let second = configure_telemetry(false /* debug */, false /* json_logs */);

        // Another test in this binary may have raced us to the first install
        assert!(first.is_ok() || second.is_err());
        assert!(matches!(second, Err(TelemetrySetupError::AlreadyInitialized(_))));
    }
}
