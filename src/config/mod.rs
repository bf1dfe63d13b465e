pub mod schema;

pub use schema::{
    BandConfig, Config, DiagnosticsConfig, LockMode, NetworkConfig, ObservabilityConfig,
    PlatformKind, QualityWeights, RemediationConfig,
};
