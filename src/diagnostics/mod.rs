//! Read-only network diagnostics: the check battery, the tool-output
//! parsers and the composite quality score.

pub mod collector;
pub mod parse;
pub mod score;
pub mod types;

pub use collector::{Collector, CollectorSettings};
pub use types::{
    CheckFailure, DiagnosticSnapshot, DnsTiming, LatencyStats, NetworkState, QualityGrade,
    QualityScore, Reading, RouteInfo, WifiLink,
};
