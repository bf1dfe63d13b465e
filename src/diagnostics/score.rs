//! Composite connection-quality score.
//!
//! Each measured check contributes a subscore in [0, 100]. The composite is
//! the weighted mean over the checks that produced a reading, so an unknown
//! check neither drags the score down nor inflates it. With nothing measured
//! the score itself is unknown.

use super::types::{
    CheckFailure, DnsTiming, LatencyStats, QualityGrade, QualityScore, Reading, WifiLink,
};
use crate::config::QualityWeights;

const LATENCY_BEST_MS: f64 = 20.0;
const LATENCY_WORST_MS: f64 = 300.0;
const LOSS_PENALTY_PER_PCT: f64 = 8.0;
const SIGNAL_BEST_DBM: f64 = -30.0;
const SIGNAL_WORST_DBM: f64 = -90.0;
const DNS_BEST_MS: f64 = 20.0;
const DNS_WORST_MS: f64 = 500.0;

/// The inputs the score is computed from.
pub struct ScoreInputs<'a> {
    pub latency: &'a Reading<LatencyStats>,
    pub packet_loss_pct: &'a Reading<f64>,
    pub link: &'a Reading<WifiLink>,
    pub dns: &'a Reading<DnsTiming>,
}

fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Linear falloff from 100 at `best` to 0 at `worst`.
fn falloff(value: f64, best: f64, worst: f64) -> f64 {
    if value <= best {
        return 100.0;
    }
    clamp_pct(100.0 * (worst - value) / (worst - best))
}

pub fn latency_subscore(avg_ms: f64) -> f64 {
    falloff(avg_ms, LATENCY_BEST_MS, LATENCY_WORST_MS)
}

pub fn loss_subscore(loss_pct: f64) -> f64 {
    clamp_pct(100.0 - LOSS_PENALTY_PER_PCT * loss_pct)
}

pub fn signal_subscore(dbm: i32) -> f64 {
    clamp_pct((f64::from(dbm) - SIGNAL_WORST_DBM) * 100.0 / (SIGNAL_BEST_DBM - SIGNAL_WORST_DBM))
}

pub fn dns_subscore(dns: &DnsTiming) -> f64 {
    match dns.avg_ms {
        Some(avg) => falloff(avg, DNS_BEST_MS, DNS_WORST_MS) * dns.success_rate(),
        None => 0.0,
    }
}

pub fn compute(inputs: &ScoreInputs<'_>, weights: &QualityWeights) -> Reading<QualityScore> {
    let mut parts: Vec<(f64, f64)> = Vec::with_capacity(4);

    if let Some(latency) = inputs.latency.value() {
        parts.push((weights.latency, latency_subscore(latency.avg_ms)));
    }
    if let Some(loss) = inputs.packet_loss_pct.value() {
        parts.push((weights.loss, loss_subscore(*loss)));
    }
    // A disconnected link has no signal to score; the other checks carry it.
    if let Some(dbm) = inputs.link.value().and_then(|l| l.signal_dbm) {
        parts.push((weights.signal, signal_subscore(dbm)));
    }
    if let Some(dns) = inputs.dns.value() {
        parts.push((weights.dns, dns_subscore(dns)));
    }

    let total_weight: f64 = parts.iter().map(|(w, _)| w).sum();
    if parts.is_empty() || total_weight <= 0.0 {
        return Reading::Unknown(CheckFailure::NoData);
    }

    let value = clamp_pct(parts.iter().map(|(w, s)| w * s).sum::<f64>() / total_weight);
    Reading::Measured(QualityScore {
        value,
        grade: QualityGrade::from_score(value),
    })
}
