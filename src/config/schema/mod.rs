mod band;
mod core;
mod diagnostics;
mod network;
mod observability;
mod remediation;

pub use band::BandConfig;
pub use self::core::Config;
pub use diagnostics::{DiagnosticsConfig, QualityWeights};
pub use network::{NetworkConfig, PlatformKind};
pub use observability::ObservabilityConfig;
pub use remediation::{LockMode, RemediationConfig};
