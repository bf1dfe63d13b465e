use crate::intent::IssueTag;
use crate::runner::Band;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Average latency above which a link counts as laggy.
pub const HIGH_LATENCY_MS: f64 = 100.0;
/// Packet loss above which a link counts as unstable.
pub const UNSTABLE_LOSS_PCT: f64 = 5.0;
/// Signal below which a link counts as weak.
pub const WEAK_SIGNAL_DBM: i32 = -70;

/// Why a check produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CheckFailure {
    #[error("timed out")]
    Timeout,
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("failed: {0}")]
    Failed(String),
    #[error("no data")]
    NoData,
}

/// A measured value, or an explicit marker that the check did not produce one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Reading<T> {
    Measured(T),
    Unknown(CheckFailure),
}

impl<T> Reading<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Measured(v) => Some(v),
            Self::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Measured(_))
    }

    pub fn failure(&self) -> Option<&CheckFailure> {
        match self {
            Self::Measured(_) => None,
            Self::Unknown(f) => Some(f),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Self::Measured(v) => Reading::Measured(f(v)),
            Self::Unknown(e) => Reading::Unknown(e),
        }
    }
}

impl<T> From<Result<T, CheckFailure>> for Reading<T> {
    fn from(result: Result<T, CheckFailure>) -> Self {
        match result {
            Ok(v) => Self::Measured(v),
            Err(e) => Self::Unknown(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsTiming {
    /// Mean over successful lookups; absent when none succeeded.
    pub avg_ms: Option<f64>,
    pub resolved: u32,
    pub attempted: u32,
}

impl DnsTiming {
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            f64::from(self.resolved) / f64::from(self.attempted)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiLink {
    pub connected: bool,
    pub ssid: Option<String>,
    pub signal_dbm: Option<i32>,
    pub band: Option<Band>,
    pub frequency_mhz: Option<u32>,
}

impl WifiLink {
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ssid: None,
            signal_dbm: None,
            band: None,
            frequency_mhz: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub ipv4_gateway: Option<String>,
    pub ipv6_gateway: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QualityGrade {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 65.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// Composite in [0, 100].
    pub value: f64,
    pub grade: QualityGrade,
}

/// The parts of the snapshot remediation logic depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState {
    pub interface: String,
    pub connected: bool,
    pub ssid: Option<String>,
    pub band: Option<Band>,
}

/// Immutable result of one diagnostics pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    pub captured_at: DateTime<Utc>,
    pub interface: String,
    pub latency: Reading<LatencyStats>,
    pub packet_loss_pct: Reading<f64>,
    pub dns: Reading<DnsTiming>,
    pub link: Reading<WifiLink>,
    pub active_connections: Reading<u32>,
    pub routes: Reading<RouteInfo>,
    /// `None` unless slow checks were requested.
    pub throughput_mbps: Option<Reading<f64>>,
    /// `None` unless slow checks were requested.
    pub route_hops: Option<Reading<u32>>,
    pub quality: Reading<QualityScore>,
}

impl DiagnosticSnapshot {
    pub fn connected(&self) -> bool {
        self.link.value().is_some_and(|l| l.connected)
    }

    pub fn ssid(&self) -> Option<&str> {
        self.link.value().and_then(|l| l.ssid.as_deref())
    }

    pub fn signal_dbm(&self) -> Option<i32> {
        self.link.value().and_then(|l| l.signal_dbm)
    }

    pub fn band(&self) -> Option<Band> {
        self.link.value().and_then(|l| l.band)
    }

    pub fn avg_latency_ms(&self) -> Option<f64> {
        self.latency.value().map(|l| l.avg_ms)
    }

    pub fn quality_grade(&self) -> Option<QualityGrade> {
        self.quality.value().map(|q| q.grade)
    }

    pub fn network_state(&self) -> NetworkState {
        NetworkState {
            interface: self.interface.clone(),
            connected: self.connected(),
            ssid: self.ssid().map(str::to_string),
            band: self.band(),
        }
    }

    /// Issue tags implied by the measurements themselves.
    pub fn observed_issues(&self) -> BTreeSet<IssueTag> {
        let mut issues = BTreeSet::new();
        if self
            .packet_loss_pct
            .value()
            .is_some_and(|loss| *loss > UNSTABLE_LOSS_PCT)
        {
            issues.insert(IssueTag::ConnectionUnstable);
        }
        if self
            .avg_latency_ms()
            .is_some_and(|avg| avg > HIGH_LATENCY_MS)
        {
            issues.insert(IssueTag::HighLatency);
        }
        if self.signal_dbm().is_some_and(|dbm| dbm < WEAK_SIGNAL_DBM) {
            issues.insert(IssueTag::WeakSignal);
        }
        if self.dns.value().is_some_and(|d| d.resolved < d.attempted) {
            issues.insert(IssueTag::DnsFailure);
        }
        issues
    }

    /// One-line status, e.g. "Connected to Home, latency 12ms".
    pub fn status_line(&self) -> String {
        let mut line = match (self.connected(), self.ssid()) {
            (true, Some(ssid)) => format!("Connected to {ssid}"),
            (true, None) => "Connected".to_string(),
            (false, _) if self.link.is_known() => "Not connected to WiFi".to_string(),
            (false, _) => "WiFi status unknown".to_string(),
        };
        match self.avg_latency_ms() {
            Some(avg) => line.push_str(&format!(", latency {avg:.0}ms")),
            None => line.push_str(", latency unknown"),
        }
        line
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A snapshot with every default check measured.
    pub(crate) fn snapshot(ssid: &str, avg_ms: f64, signal_dbm: i32, band: Band) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            captured_at: Utc::now(),
            interface: "wlan0".into(),
            latency: Reading::Measured(LatencyStats {
                min_ms: avg_ms - 2.0,
                avg_ms,
                max_ms: avg_ms + 3.0,
            }),
            packet_loss_pct: Reading::Measured(0.0),
            dns: Reading::Measured(DnsTiming {
                avg_ms: Some(15.0),
                resolved: 3,
                attempted: 3,
            }),
            link: Reading::Measured(WifiLink {
                connected: true,
                ssid: Some(ssid.into()),
                signal_dbm: Some(signal_dbm),
                band: Some(band),
                frequency_mhz: None,
            }),
            active_connections: Reading::Measured(2),
            routes: Reading::Measured(RouteInfo {
                ipv4_gateway: Some("192.168.1.1".into()),
                ipv6_gateway: None,
            }),
            throughput_mbps: None,
            route_hops: None,
            quality: Reading::Measured(QualityScore {
                value: 90.0,
                grade: QualityGrade::Excellent,
            }),
        }
    }
}
