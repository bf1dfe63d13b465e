use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relative weight of each quality subscore. Weights are renormalised over
/// the checks that produced a reading, so they need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    #[serde(default = "default_latency_weight")]
    pub latency: f64,
    #[serde(default = "default_loss_weight")]
    pub loss: f64,
    #[serde(default = "default_signal_weight")]
    pub signal: f64,
    #[serde(default = "default_dns_weight")]
    pub dns: f64,
}

fn default_latency_weight() -> f64 {
    0.30
}

fn default_loss_weight() -> f64 {
    0.20
}

fn default_signal_weight() -> f64 {
    0.30
}

fn default_dns_weight() -> f64 {
    0.20
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            latency: default_latency_weight(),
            loss: default_loss_weight(),
            signal: default_signal_weight(),
            dns: default_dns_weight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Per-check deadline for the default battery.
    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,
    /// Deadline for throughput and route-trace checks.
    #[serde(default = "default_slow_check_timeout_secs")]
    pub slow_check_timeout_secs: u64,
    /// Retry a check once when it fails transiently.
    #[serde(default = "default_true")]
    pub retry_transient: bool,
    #[serde(default)]
    pub weights: QualityWeights,
}

fn default_check_timeout_secs() -> u64 {
    4
}

fn default_slow_check_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            check_timeout_secs: default_check_timeout_secs(),
            slow_check_timeout_secs: default_slow_check_timeout_secs(),
            retry_transient: true,
            weights: QualityWeights::default(),
        }
    }
}

impl DiagnosticsConfig {
    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn slow_check_timeout(&self) -> Duration {
        Duration::from_secs(self.slow_check_timeout_secs)
    }
}
