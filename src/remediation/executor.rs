use super::actions::{ActionCommand, ActionErrorKind, ActionId, FixAction, FixAttemptResult};
use super::band::BandComparator;
use crate::diagnostics::{Collector, DiagnosticSnapshot, NetworkState};
use crate::runner::{CommandError, CommandOutput, CommandRunner, NetCommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Progress reported while a plan runs. Lets the caller keep whatever was
/// finished if it stops waiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemediationEvent {
    ActionStarted { action_id: ActionId },
    ActionFinished { result: FixAttemptResult },
    ActionSkipped { action_id: ActionId },
    AfterSnapshot { snapshot: Box<DiagnosticSnapshot> },
}

pub type EventSender = mpsc::UnboundedSender<RemediationEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<RemediationEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Everything a finished (or cancelled) run produced.
#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    pub attempts: Vec<FixAttemptResult>,
    pub skipped: Vec<ActionId>,
    pub after: Option<DiagnosticSnapshot>,
}

/// Runs a plan strictly in order, one action at a time.
#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    collector: Collector,
    comparator: BandComparator,
    action_timeout: Duration,
}

impl Executor {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        collector: Collector,
        comparator: BandComparator,
        action_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            collector,
            comparator,
            action_timeout,
        }
    }

    /// Execute `plan`. Cancellation is honoured between actions only; an
    /// action that has started always runs to completion. The after
    /// snapshot is captured once the last action has finished, unless the
    /// run was cancelled.
    pub async fn execute(
        &self,
        plan: &[FixAction],
        state: &NetworkState,
        cancel: &CancellationToken,
        events: &EventSender,
    ) -> ExecutionSummary {
        let mut summary = ExecutionSummary::default();

        for action in plan {
            if cancel.is_cancelled() {
                tracing::warn!(action = %action.id, "run cancelled, skipping action");
                events
                    .send(RemediationEvent::ActionSkipped {
                        action_id: action.id,
                    })
                    .ok();
                summary.skipped.push(action.id);
                continue;
            }

            events
                .send(RemediationEvent::ActionStarted {
                    action_id: action.id,
                })
                .ok();
            let result = self.run_action(action, state).await;
            if result.success {
                tracing::info!(action = %action.id, retried = result.retried, "fix action succeeded");
            } else {
                tracing::warn!(
                    action = %action.id,
                    error = ?result.error,
                    message = %result.message,
                    "fix action failed"
                );
            }
            events
                .send(RemediationEvent::ActionFinished {
                    result: result.clone(),
                })
                .ok();
            summary.attempts.push(result);
        }

        if !cancel.is_cancelled() {
            let after = self.collector.collect(false).await;
            events
                .send(RemediationEvent::AfterSnapshot {
                    snapshot: Box::new(after.clone()),
                })
                .ok();
            summary.after = Some(after);
        }
        summary
    }

    async fn run_action(&self, action: &FixAction, state: &NetworkState) -> FixAttemptResult {
        let started = Instant::now();
        match &action.command {
            ActionCommand::Single(command) => {
                let (outcome, retried) = self.run_single(action, command).await;
                let (success, error, message) = match outcome {
                    Ok(()) => (true, None, format!("{} completed", action.id)),
                    Err((kind, detail)) => (false, Some(kind), detail),
                };
                FixAttemptResult {
                    action_id: action.id,
                    success,
                    message,
                    duration: started.elapsed(),
                    error,
                    retried,
                    band_comparison: None,
                }
            }
            ActionCommand::BandComparison => {
                let outcome = match state.band {
                    Some(band) => self.comparator.compare(band).await,
                    None => {
                        return FixAttemptResult {
                            action_id: action.id,
                            success: false,
                            message: "current band unknown".into(),
                            duration: started.elapsed(),
                            error: Some(ActionErrorKind::Failed),
                            retried: false,
                            band_comparison: None,
                        };
                    }
                };
                FixAttemptResult {
                    action_id: action.id,
                    success: outcome.success(),
                    message: outcome.message(),
                    duration: started.elapsed(),
                    error: outcome.error.as_ref().map(|(kind, _)| *kind),
                    retried: false,
                    band_comparison: Some(outcome.comparison),
                }
            }
        }
    }

    /// Run one command, retrying once when the action is idempotent and the
    /// failure is transient. Permission failures and timeouts are never
    /// retried, since a timed-out change may already have been applied.
    async fn run_single(
        &self,
        action: &FixAction,
        command: &NetCommand,
    ) -> (Result<(), (ActionErrorKind, String)>, bool) {
        let first = self.runner.run(command, self.action_timeout).await;
        let retry = action.idempotent && matches!(&first, Err(e) if e.is_retryable(command));
        if !retry {
            return (map_outcome(first), false);
        }
        tracing::debug!(action = %action.id, "retrying idempotent action after transient failure");
        let second = self.runner.run(command, self.action_timeout).await;
        (map_outcome(second), true)
    }
}

fn map_outcome(result: Result<CommandOutput, CommandError>) -> Result<(), (ActionErrorKind, String)> {
    match result {
        Ok(out) if out.succeeded() => Ok(()),
        Ok(out) => {
            let stderr = out.stderr.trim();
            let detail = if stderr.is_empty() {
                format!("exited with code {}", out.exit_code)
            } else {
                format!("exited with code {}: {stderr}", out.exit_code)
            };
            Err((ActionErrorKind::Failed, detail))
        }
        Err(CommandError::PermissionDenied(detail)) => Err((
            ActionErrorKind::PermissionDenied,
            format!("elevated privileges required: {detail}"),
        )),
        Err(e @ CommandError::Timeout { .. }) => Err((ActionErrorKind::Timeout, e.to_string())),
        Err(e) => Err((ActionErrorKind::Failed, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::diagnostics::CollectorSettings;
    use crate::runner::{Band, FakeCommandRunner, FakeResponse};

    fn executor(fake: &Arc<FakeCommandRunner>) -> Executor {
        let config = Config::default();
        let collector = Collector::new(fake.clone(), CollectorSettings::from_config(&config));
        let comparator =
            BandComparator::new(fake.clone(), collector.clone(), Duration::from_secs(1), 5.0);
        Executor::new(fake.clone(), collector, comparator, Duration::from_millis(200))
    }

    fn state() -> NetworkState {
        NetworkState {
            interface: "wlan0".into(),
            connected: true,
            ssid: Some("Home".into()),
            band: Some(Band::Five),
        }
    }

    fn plan() -> Vec<FixAction> {
        vec![
            FixAction::flush_dns(),
            FixAction::restart_network_stack(),
            FixAction::reset_adapter(),
        ]
    }

    #[tokio::test]
    async fn runs_plan_in_order_then_captures_after_snapshot() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        let (tx, mut rx) = event_channel();
        let summary = executor(&fake)
            .execute(&plan(), &state(), &CancellationToken::new(), &tx)
            .await;

        let ids: Vec<_> = summary.attempts.iter().map(|a| a.action_id).collect();
        assert_eq!(
            ids,
            vec![ActionId::FlushDns, ActionId::RestartNetworkStack, ActionId::ResetAdapter]
        );
        assert!(summary.attempts.iter().all(|a| a.success));
        assert!(summary.after.is_some());
        assert_eq!(
            fake.mutations(),
            vec![
                NetCommand::FlushDnsCache,
                NetCommand::RestartNetworkStack,
                NetCommand::ResetAdapter
            ]
        );

        // The after snapshot follows the last action.
        let last_mutation = fake.calls().iter().rposition(NetCommand::is_mutating).unwrap();
        let last_status = fake
            .calls()
            .iter()
            .rposition(|c| *c == NetCommand::WifiStatus)
            .unwrap();
        assert!(last_status > last_mutation);

        drop(tx);
        let mut finished = 0;
        while let Some(event) = rx.recv().await {
            if matches!(event, RemediationEvent::ActionFinished { .. }) {
                finished += 1;
            }
        }
        assert_eq!(finished, 3);
    }

    #[tokio::test]
    async fn permission_failure_does_not_stop_the_plan() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        fake.set(
            NetCommand::RestartNetworkStack,
            FakeResponse::error(CommandError::PermissionDenied("sudo: a password is required".into())),
        );
        let (tx, _rx) = event_channel();
        let summary = executor(&fake)
            .execute(&plan(), &state(), &CancellationToken::new(), &tx)
            .await;

        assert_eq!(summary.attempts.len(), 3);
        let stack = &summary.attempts[1];
        assert!(!stack.success);
        assert_eq!(stack.error, Some(ActionErrorKind::PermissionDenied));
        assert!(!stack.retried);
        assert!(summary.attempts[2].success);
        assert_eq!(fake.call_count(&NetCommand::RestartNetworkStack), 1);
    }

    #[tokio::test]
    async fn transient_failure_retried_only_for_idempotent_actions() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        fake.push(
            NetCommand::FlushDnsCache,
            FakeResponse::error(CommandError::Io("resource busy".into())),
        );
        fake.push(
            NetCommand::ResetAdapter,
            FakeResponse::error(CommandError::Io("resource busy".into())),
        );
        let (tx, _rx) = event_channel();
        let summary = executor(&fake)
            .execute(&plan(), &state(), &CancellationToken::new(), &tx)
            .await;

        let flush = &summary.attempts[0];
        assert!(flush.success && flush.retried);
        let reset = &summary.attempts[2];
        assert!(!reset.success && !reset.retried);
        assert_eq!(fake.call_count(&NetCommand::ResetAdapter), 1);
    }

    #[tokio::test]
    async fn non_zero_exit_is_failed_not_retried() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        fake.set(NetCommand::FlushDnsCache, FakeResponse::exit(1, "Failed to flush caches"));
        let (tx, _rx) = event_channel();
        let summary = executor(&fake)
            .execute(&plan()[..1], &state(), &CancellationToken::new(), &tx)
            .await;
        let flush = &summary.attempts[0];
        assert_eq!(flush.error, Some(ActionErrorKind::Failed));
        assert!(flush.message.contains("Failed to flush caches"));
        assert_eq!(fake.call_count(&NetCommand::FlushDnsCache), 1);
    }

    #[tokio::test]
    async fn slow_action_times_out() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        fake.set(
            NetCommand::ResetAdapter,
            FakeResponse::ok("").delayed(Duration::from_secs(5)),
        );
        let (tx, _rx) = event_channel();
        let summary = executor(&fake)
            .execute(&plan(), &state(), &CancellationToken::new(), &tx)
            .await;
        assert_eq!(summary.attempts[2].error, Some(ActionErrorKind::Timeout));
    }

    #[tokio::test]
    async fn timed_out_mutation_is_not_repeated() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        fake.set(
            NetCommand::RenewDhcpLease,
            FakeResponse::ok("").delayed(Duration::from_secs(1)),
        );
        let (tx, _rx) = event_channel();
        let summary = executor(&fake)
            .execute(&[FixAction::renew_dhcp()], &state(), &CancellationToken::new(), &tx)
            .await;

        let renew = &summary.attempts[0];
        assert_eq!(renew.error, Some(ActionErrorKind::Timeout));
        assert!(!renew.retried);
        assert_eq!(fake.call_count(&NetCommand::RenewDhcpLease), 1);
    }

    #[tokio::test]
    async fn events_are_optional() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        let (tx, rx) = event_channel();
        drop(rx);
        let summary = executor(&fake)
            .execute(&plan(), &state(), &CancellationToken::new(), &tx)
            .await;
        assert_eq!(summary.attempts.len(), 3);
        assert!(summary.after.is_some());
    }

    #[tokio::test]
    async fn cancelled_run_skips_remaining_actions() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, _rx) = event_channel();
        let summary = executor(&fake).execute(&plan(), &state(), &cancel, &tx).await;
        assert!(summary.attempts.is_empty());
        assert_eq!(summary.skipped.len(), 3);
        assert!(summary.after.is_none());
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn repeating_an_idempotent_flush_is_harmless() {
        let fake = Arc::new(FakeCommandRunner::healthy());
        let exec = executor(&fake);
        let (tx, _rx) = event_channel();
        let once = vec![FixAction::flush_dns()];
        let first = exec.execute(&once, &state(), &CancellationToken::new(), &tx).await;
        let second = exec.execute(&once, &state(), &CancellationToken::new(), &tx).await;
        assert!(first.attempts[0].success);
        assert!(second.attempts[0].success);
        assert_eq!(second.attempts[0].error, None);
    }
}
