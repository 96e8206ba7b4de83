#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Maximum level for this crate's events: `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Plain-text copy of the log. Disabled when unset.
    pub log_file: Option<String>,
    /// Emit JSON lines on stdout instead of the pretty format.
    pub json: bool,
    /// OTLP gRPC endpoint, e.g. `http://localhost:4317`. Disabled when unset.
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
            json: false,
            otlp_endpoint: None,
        }
    }
}

impl TelemetryConfig {
    pub fn level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}
