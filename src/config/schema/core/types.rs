use super::super::{
    BandConfig, DiagnosticsConfig, NetworkConfig, ObservabilityConfig, RemediationConfig,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub remediation: RemediationConfig,

    #[serde(default)]
    pub band: BandConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}
