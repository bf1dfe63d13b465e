//! Two-phase band comparison.
//!
//! Measure throughput on the active band, switch to the other band and
//! measure again, then keep whichever band is clearly faster. Every failure
//! path tries to put the device back on the band it started on.

use super::actions::{ActionErrorKind, BandComparison};
use crate::diagnostics::{CheckFailure, Collector, Reading};
use crate::runner::{Band, CommandError, CommandRunner, NetCommand};
use std::sync::Arc;
use std::time::Duration;

/// Result of [`BandComparator::compare`]: the comparison record plus the
/// error that stopped it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct BandOutcome {
    pub comparison: BandComparison,
    pub error: Option<(ActionErrorKind, String)>,
}

impl BandOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn message(&self) -> String {
        let c = &self.comparison;
        if let Some((_, detail)) = &self.error {
            return detail.clone();
        }
        let fmt = |r: &Reading<f64>| match r.value() {
            Some(mbps) => format!("{mbps:.1} Mbps"),
            None => "unknown".to_string(),
        };
        let verdict = if c.switched {
            format!("switched to {}", c.alternate_band)
        } else {
            format!("stayed on {}", c.original_band)
        };
        format!(
            "{}: {}, {}: {}; {verdict}",
            c.original_band,
            fmt(&c.original_mbps),
            c.alternate_band,
            fmt(&c.alternate_mbps)
        )
    }
}

fn classify_switch_error(error: &CommandError) -> ActionErrorKind {
    match error {
        CommandError::PermissionDenied(_) => ActionErrorKind::PermissionDenied,
        CommandError::Timeout { .. } => ActionErrorKind::Timeout,
        CommandError::Unavailable(_) | CommandError::Io(_) => ActionErrorKind::Failed,
    }
}

#[derive(Clone)]
pub struct BandComparator {
    runner: Arc<dyn CommandRunner>,
    collector: Collector,
    switch_timeout: Duration,
    threshold_pct: f64,
}

impl BandComparator {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        collector: Collector,
        switch_timeout: Duration,
        threshold_pct: f64,
    ) -> Self {
        Self {
            runner,
            collector,
            switch_timeout,
            threshold_pct,
        }
    }

    /// True when `alternate` beats `original` by more than the noise threshold.
    pub fn prefers_alternate(&self, original_mbps: f64, alternate_mbps: f64) -> bool {
        alternate_mbps > original_mbps * (1.0 + self.threshold_pct / 100.0)
    }

    async fn switch_to(&self, band: Band) -> Result<(), (ActionErrorKind, String)> {
        let command = NetCommand::SwitchBand { band };
        match self.runner.run(&command, self.switch_timeout).await {
            Ok(out) if out.succeeded() => {
                tracing::info!(%band, "switched band");
                Ok(())
            }
            Ok(out) => Err((
                ActionErrorKind::Failed,
                format!("switch to {band} exited with {}: {}", out.exit_code, out.stderr.trim()),
            )),
            Err(e) => Err((classify_switch_error(&e), format!("switch to {band}: {e}"))),
        }
    }

    /// Return to `band`, trying twice. Restoring connectivity is the one
    /// band switch that is repeated.
    async fn restore(&self, band: Band) -> bool {
        for attempt in 1..=2 {
            match self.switch_to(band).await {
                Ok(()) => return true,
                Err((_, detail)) => {
                    tracing::warn!(%band, attempt, %detail, "failed to restore band");
                }
            }
        }
        false
    }

    pub async fn compare(&self, current: Band) -> BandOutcome {
        let alternate = current.alternate();
        let mut comparison = BandComparison {
            original_band: current,
            alternate_band: alternate,
            original_mbps: Reading::Unknown(CheckFailure::NoData),
            alternate_mbps: Reading::Unknown(CheckFailure::NoData),
            final_band: Some(current),
            switched: false,
            threshold_pct: self.threshold_pct,
        };

        comparison.original_mbps = self.collector.measure_throughput().await;
        let Some(&original) = comparison.original_mbps.value() else {
            // Nothing to compare against; leave the link alone.
            return BandOutcome {
                comparison,
                error: Some((
                    ActionErrorKind::Failed,
                    format!("could not measure throughput on {current}"),
                )),
            };
        };

        if let Err((kind, detail)) = self.switch_to(alternate).await {
            let restored = self.restore(current).await;
            comparison.final_band = restored.then_some(current);
            return BandOutcome {
                comparison,
                error: Some((kind, detail)),
            };
        }

        comparison.alternate_mbps = self.collector.measure_throughput().await;
        let Some(&alt) = comparison.alternate_mbps.value() else {
            let restored = self.restore(current).await;
            comparison.final_band = if restored { Some(current) } else { Some(alternate) };
            return BandOutcome {
                comparison,
                error: Some((
                    ActionErrorKind::Failed,
                    format!("could not measure throughput on {alternate}"),
                )),
            };
        };

        tracing::info!(
            original = %current,
            original_mbps = original,
            alternate = %alternate,
            alternate_mbps = alt,
            threshold_pct = self.threshold_pct,
            "band comparison measured"
        );

        if self.prefers_alternate(original, alt) {
            comparison.final_band = Some(alternate);
            comparison.switched = true;
        } else if self.restore(current).await {
            comparison.final_band = Some(current);
        } else {
            // Still on the alternate band, which is connected and working.
            comparison.final_band = Some(alternate);
            comparison.switched = true;
        }
        BandOutcome {
            comparison,
            error: None,
        }
    }
}
