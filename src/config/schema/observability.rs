use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ObservabilityConfig {
    /// Parsed log level, falling back to `INFO` for anything unrecognised.
    pub fn level(&self) -> tracing::Level {
        self.log_level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO)
    }
}
