use super::Config;
use crate::error::ConfigError;
use crate::runner::ping_deadline_secs;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.diagnostics.weights;
        let weights = [
            ("latency", w.latency),
            ("loss", w.loss),
            ("signal", w.signal),
            ("dns", w.dns),
        ];
        for (name, value) in weights {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "diagnostics.weights.{name} must be a non-negative number"
                )));
            }
        }
        if weights.iter().map(|(_, v)| v).sum::<f64>() <= 0.0 {
            return Err(ConfigError::Validation(
                "diagnostics.weights must not all be zero".into(),
            ));
        }

        let threshold = self.band.noise_threshold_pct;
        if threshold.is_nan() || threshold < 0.0 {
            return Err(ConfigError::Validation(
                "band.noise_threshold_pct must be >= 0".into(),
            ));
        }

        if self.remediation.max_actions == 0 {
            return Err(ConfigError::Validation(
                "remediation.max_actions must be >= 1".into(),
            ));
        }
        if self.remediation.deadline_secs == 0 {
            return Err(ConfigError::Validation(
                "remediation.deadline_secs must be >= 1".into(),
            ));
        }
        if self.diagnostics.check_timeout_secs == 0 || self.remediation.action_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "check and action timeouts must be >= 1 second".into(),
            ));
        }
        if self.network.ping_count == 0 {
            return Err(ConfigError::Validation(
                "network.ping_count must be >= 1".into(),
            ));
        }
        let ping_deadline = ping_deadline_secs(self.network.ping_count);
        if self.diagnostics.check_timeout_secs <= ping_deadline {
            return Err(ConfigError::Validation(format!(
                "diagnostics.check_timeout_secs must exceed the {ping_deadline}s ping deadline for \
                 network.ping_count = {}",
                self.network.ping_count
            )));
        }
        if self.network.interface.trim().is_empty() {
            return Err(ConfigError::Validation(
                "network.interface must not be empty".into(),
            ));
        }
        Ok(())
    }
}
