use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandConfig {
    /// Minimum relative gain (percent) the alternate band must show before
    /// the comparator stays on it.
    #[serde(default = "default_noise_threshold_pct")]
    pub noise_threshold_pct: f64,
    /// Connection profile that joins the 2.4GHz network.
    #[serde(default)]
    pub profile_2g: String,
    /// Connection profile that joins the 5GHz network.
    #[serde(default)]
    pub profile_5g: String,
}

fn default_noise_threshold_pct() -> f64 {
    5.0
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            noise_threshold_pct: default_noise_threshold_pct(),
            profile_2g: String::new(),
            profile_5g: String::new(),
        }
    }
}

impl BandConfig {
    /// Band switching needs a profile for both bands.
    pub fn switching_configured(&self) -> bool {
        !self.profile_2g.trim().is_empty() && !self.profile_5g.trim().is_empty()
    }
}
