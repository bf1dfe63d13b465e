use super::parse;
use super::score::{self, ScoreInputs};
use super::types::{
    CheckFailure, DiagnosticSnapshot, DnsTiming, LatencyStats, Reading, RouteInfo, WifiLink,
};
use crate::config::{Config, QualityWeights};
use crate::runner::{CommandError, CommandOutput, CommandRunner, NetCommand};
use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Slack given to a runner past the check timeout before the collector
/// abandons the call itself.
const RUNNER_GRACE: Duration = Duration::from_millis(250);

/// Everything a diagnostics pass needs from the configuration.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub interface: String,
    pub ping_host: String,
    pub ping_count: u32,
    pub dns_hosts: Vec<String>,
    pub trace_host: String,
    pub check_timeout: Duration,
    pub slow_check_timeout: Duration,
    pub retry_transient: bool,
    pub weights: QualityWeights,
}

impl CollectorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interface: config.network.interface.clone(),
            ping_host: config.network.ping_host.clone(),
            ping_count: config.network.ping_count,
            dns_hosts: config.network.dns_hosts.clone(),
            trace_host: config.network.trace_host.clone(),
            check_timeout: config.diagnostics.check_timeout(),
            slow_check_timeout: config.diagnostics.slow_check_timeout(),
            retry_transient: config.diagnostics.retry_transient,
            weights: config.diagnostics.weights,
        }
    }
}

impl From<CommandError> for CheckFailure {
    fn from(error: CommandError) -> Self {
        match error {
            CommandError::Timeout { .. } => Self::Timeout,
            CommandError::Unavailable(detail) => Self::Unavailable(detail),
            CommandError::PermissionDenied(detail) => {
                Self::Failed(format!("permission denied: {detail}"))
            }
            CommandError::Io(detail) => Self::Failed(detail),
        }
    }
}

fn exit_failure(output: &CommandOutput) -> CheckFailure {
    let detail = output.stderr.trim();
    if detail.is_empty() {
        CheckFailure::Failed(format!("exit code {}", output.exit_code))
    } else {
        CheckFailure::Failed(detail.to_string())
    }
}

fn require_success(output: CommandOutput) -> Result<CommandOutput, CheckFailure> {
    if output.succeeded() {
        Ok(output)
    } else {
        Err(exit_failure(&output))
    }
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Runs the read-only check battery and builds a [`DiagnosticSnapshot`].
///
/// Checks never mutate network state, so the default battery runs
/// concurrently. Every check is bounded by its own timeout and a failing
/// check becomes an explicit unknown reading.
#[derive(Clone)]
pub struct Collector {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<CollectorSettings>,
}

impl Collector {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: CollectorSettings) -> Self {
        Self {
            runner,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Capture a snapshot. Throughput and route tracing only run when
    /// `include_slow` is set.
    pub async fn collect(&self, include_slow: bool) -> DiagnosticSnapshot {
        let ((latency, packet_loss_pct), dns, link, active_connections, routes) = tokio::join!(
            self.check_ping(),
            self.check_dns(),
            self.check_wifi(),
            self.check_connections(),
            self.check_routes(),
        );

        let (throughput_mbps, route_hops) = if include_slow {
            let throughput = self.measure_throughput().await;
            let hops = self.check_trace().await;
            (Some(throughput), Some(hops))
        } else {
            (None, None)
        };

        let quality = score::compute(
            &ScoreInputs {
                latency: &latency,
                packet_loss_pct: &packet_loss_pct,
                link: &link,
                dns: &dns,
            },
            &self.settings.weights,
        );

        let snapshot = DiagnosticSnapshot {
            captured_at: Utc::now(),
            interface: self.settings.interface.clone(),
            latency,
            packet_loss_pct,
            dns,
            link,
            active_connections,
            routes,
            throughput_mbps,
            route_hops,
            quality,
        };
        tracing::info!(
            interface = %snapshot.interface,
            quality = ?snapshot.quality.value().map(|q| q.value),
            slow = include_slow,
            "diagnostics pass complete"
        );
        snapshot
    }

    /// Run one throughput test on whatever band is currently active.
    pub async fn measure_throughput(&self) -> Reading<f64> {
        let result = self
            .run_check(&NetCommand::ThroughputTest, self.settings.slow_check_timeout)
            .await
            .and_then(require_success)
            .and_then(|out| {
                parse::parse_download_mbps(&out.stdout)
                    .ok_or_else(|| CheckFailure::Failed("no download rate in output".into()))
            });
        log_check("throughput", &result);
        result.into()
    }

    /// Run `command`, retrying once on a transient failure when enabled.
    async fn run_check(
        &self,
        command: &NetCommand,
        timeout: Duration,
    ) -> Result<CommandOutput, CheckFailure> {
        match self.run_bounded(command, timeout).await {
            Err(e) if e.is_retryable(command) && self.settings.retry_transient => {
                tracing::debug!(command = %command, error = %e, "retrying check");
                self.run_bounded(command, timeout).await.map_err(Into::into)
            }
            other => other.map_err(Into::into),
        }
    }

    async fn run_bounded(
        &self,
        command: &NetCommand,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        match tokio::time::timeout(timeout + RUNNER_GRACE, self.runner.run(command, timeout)).await
        {
            Ok(result) => result,
            Err(_) => Err(CommandError::Timeout { after: timeout }),
        }
    }

    async fn check_ping(&self) -> (Reading<LatencyStats>, Reading<f64>) {
        let command = NetCommand::Ping {
            host: self.settings.ping_host.clone(),
            count: self.settings.ping_count,
        };
        // Ping exits non-zero on total loss but still prints a summary.
        let output = match self.run_check(&command, self.settings.check_timeout).await {
            Ok(output) => output,
            Err(failure) => {
                tracing::debug!(check = "ping", %failure, "check failed");
                return (Reading::Unknown(failure.clone()), Reading::Unknown(failure));
            }
        };

        let summary = parse::parse_ping(&output.stdout);
        let loss = match summary.loss_pct {
            Some(loss) => Reading::Measured(loss),
            None => Reading::Unknown(exit_failure(&output)),
        };
        let latency = match summary.latency {
            Some(stats) => Reading::Measured(stats),
            None if loss.is_known() => Reading::Unknown(CheckFailure::Failed("no replies".into())),
            None => Reading::Unknown(exit_failure(&output)),
        };
        tracing::debug!(check = "ping", ?latency, ?loss, "check complete");
        (latency, loss)
    }

    async fn check_dns(&self) -> Reading<DnsTiming> {
        if self.settings.dns_hosts.is_empty() {
            return Reading::Unknown(CheckFailure::NoData);
        }
        let lookups = self.settings.dns_hosts.iter().map(|host| async move {
            let command = NetCommand::ResolveHost { host: host.clone() };
            self.run_check(&command, self.settings.check_timeout).await
        });
        let results = join_all(lookups).await;

        // A resolver that cannot be queried at all says nothing about DNS health.
        // Lookups that fail or time out are a measured 0% success rate.
        if let Some(Err(CheckFailure::Unavailable(detail))) = results.first()
            && results
                .iter()
                .all(|r| matches!(r, Err(CheckFailure::Unavailable(_))))
        {
            return Reading::Unknown(CheckFailure::Unavailable(detail.clone()));
        }

        let timings: Vec<f64> = results
            .iter()
            .filter_map(|r| match r {
                Ok(out) if out.succeeded() && !out.stdout.trim().is_empty() => {
                    Some(duration_ms(out.duration))
                }
                _ => None,
            })
            .collect();
        let attempted = u32::try_from(results.len()).unwrap_or(u32::MAX);
        let resolved = u32::try_from(timings.len()).unwrap_or(u32::MAX);
        let avg_ms = (!timings.is_empty()).then(|| timings.iter().sum::<f64>() / timings.len() as f64);

        let timing = DnsTiming {
            avg_ms,
            resolved,
            attempted,
        };
        tracing::debug!(check = "dns", ?timing, "check complete");
        Reading::Measured(timing)
    }

    async fn check_wifi(&self) -> Reading<WifiLink> {
        let result = self
            .run_check(&NetCommand::WifiStatus, self.settings.check_timeout)
            .await
            .and_then(require_success)
            .and_then(|out| {
                parse::parse_wifi_status(&out.stdout)
                    .ok_or_else(|| CheckFailure::Failed("unrecognised wifi status output".into()))
            });
        log_check("wifi", &result);
        result.into()
    }

    async fn check_connections(&self) -> Reading<u32> {
        let result = self
            .run_check(&NetCommand::ActiveConnections, self.settings.check_timeout)
            .await
            .and_then(require_success)
            .map(|out| parse::count_established(&out.stdout));
        log_check("connections", &result);
        result.into()
    }

    async fn check_routes(&self) -> Reading<RouteInfo> {
        let v4 = NetCommand::DefaultRoute { ipv6: false };
        let v6 = NetCommand::DefaultRoute { ipv6: true };
        let (v4, v6) = tokio::join!(
            self.run_check(&v4, self.settings.check_timeout),
            self.run_check(&v6, self.settings.check_timeout),
        );

        let result = v4.and_then(require_success).map(|out| RouteInfo {
            ipv4_gateway: parse::parse_default_gateway(&out.stdout),
            // IPv6 is optional; its absence is not a failed check.
            ipv6_gateway: v6
                .ok()
                .filter(CommandOutput::succeeded)
                .and_then(|out| parse::parse_default_gateway(&out.stdout)),
        });
        log_check("routes", &result);
        result.into()
    }

    async fn check_trace(&self) -> Reading<u32> {
        let command = NetCommand::TraceRoute {
            host: self.settings.trace_host.clone(),
        };
        let result = self
            .run_check(&command, self.settings.slow_check_timeout)
            .await
            .and_then(require_success)
            .and_then(|out| {
                parse::parse_hop_count(&out.stdout)
                    .ok_or_else(|| CheckFailure::Failed("no hops in output".into()))
            });
        log_check("trace", &result);
        result.into()
    }
}

fn log_check<T: std::fmt::Debug>(check: &'static str, result: &Result<T, CheckFailure>) {
    match result {
        Ok(value) => tracing::debug!(check, ?value, "check complete"),
        Err(failure) => tracing::debug!(check, %failure, "check failed"),
    }
}
