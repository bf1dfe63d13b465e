use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use netmedic::config::LockMode;
use netmedic::intent::Intent;
use netmedic::knowledge::KnowledgeRetriever;
use netmedic::remediation::{ActionErrorKind, ActionId, InterfaceLocks};
use netmedic::runner::{CommandError, CommandRunner, FakeCommandRunner, FakeResponse, NetCommand};
use netmedic::{Config, Engine, RunOutcome};

use crate::engine_harness::engine_with;

#[tokio::test]
async fn permission_denied_does_not_stop_the_plan() {
    let fake = Arc::new(FakeCommandRunner::healthy());
    fake.set(
        NetCommand::RestartNetworkStack,
        FakeResponse::error(CommandError::PermissionDenied(
            "sudo: a password is required".into(),
        )),
    );
    let engine = engine_with(&fake, Config::default());

    let report = engine
        .diagnose("My WiFi connection is unstable", false)
        .await
        .unwrap();

    assert_eq!(report.attempts.len(), 3);
    let denied = &report.attempts[1];
    assert_eq!(denied.action_id, ActionId::RestartNetworkStack);
    assert!(!denied.success);
    assert_eq!(denied.error, Some(ActionErrorKind::PermissionDenied));
    assert!(!denied.retried);
    assert!(report.attempts[2].success);
    assert_eq!(report.attempts[2].action_id, ActionId::ResetAdapter);
    assert_eq!(fake.call_count(&NetCommand::RestartNetworkStack), 1);
    assert_eq!(report.outcome, RunOutcome::Completed);

    let sections = report.sections();
    assert_eq!(sections.fixed.len(), 2);
    assert_eq!(sections.failed.len(), 1);
    assert!(sections.failed[0].contains("permission_denied"));
}

#[tokio::test]
async fn transient_failure_of_idempotent_action_is_retried_once() {
    let fake = Arc::new(FakeCommandRunner::healthy());
    fake.push(
        NetCommand::FlushDnsCache,
        FakeResponse::error(CommandError::Io("resource temporarily unavailable".into())),
    );
    let engine = engine_with(&fake, Config::default());

    let report = engine
        .diagnose("dns is broken, sites won't load", false)
        .await
        .unwrap();

    let flush = &report.attempts[0];
    assert_eq!(flush.action_id, ActionId::FlushDns);
    assert!(flush.success);
    assert!(flush.retried);
    assert_eq!(fake.call_count(&NetCommand::FlushDnsCache), 2);
}

#[tokio::test]
async fn deadline_returns_partial_report() {
    let fake = Arc::new(FakeCommandRunner::healthy());
    fake.set(
        NetCommand::RestartNetworkStack,
        FakeResponse::ok("").delayed(Duration::from_secs(3)),
    );
    let mut config = Config::default();
    config.remediation.deadline_secs = 1;
    let engine = engine_with(&fake, config);

    let report = engine
        .diagnose("My WiFi connection is unstable", false)
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::DeadlineExceeded);
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(report.attempts[0].action_id, ActionId::FlushDns);
    assert_eq!(report.skipped, vec![ActionId::ResetAdapter]);
    assert!(report.after.is_none());
    assert!(report.warnings.iter().any(|w| w.contains("deadline")));
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains("restart_network_stack"))
    );
}

#[tokio::test]
async fn held_interface_lock_rejects_second_run() {
    let fake = Arc::new(FakeCommandRunner::healthy());
    let locks = Arc::new(InterfaceLocks::new());
    let mut config = Config::default();
    config.remediation.lock_mode = LockMode::Reject;
    let engine = Engine::builder()
        .config(config)
        .runner(Arc::clone(&fake) as Arc<dyn CommandRunner>)
        .locks(Arc::clone(&locks))
        .build()
        .unwrap();

    let _held = locks
        .acquire("wlan0", LockMode::Reject, Duration::ZERO)
        .await
        .unwrap();
    let report = engine
        .diagnose("My WiFi connection is unstable", false)
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::RemediationInProgress);
    assert!(report.attempts.is_empty());
    assert_eq!(report.skipped.len(), 3);
    assert!(fake.mutations().is_empty());
    assert!(!report.warnings.is_empty());
}

#[tokio::test]
async fn waiting_run_proceeds_once_lock_is_released() {
    let fake = Arc::new(FakeCommandRunner::healthy());
    let locks = Arc::new(InterfaceLocks::new());
    let engine = Engine::builder()
        .runner(Arc::clone(&fake) as Arc<dyn CommandRunner>)
        .locks(Arc::clone(&locks))
        .build()
        .unwrap();

    let held = locks
        .acquire("wlan0", LockMode::Reject, Duration::ZERO)
        .await
        .unwrap();
    let release = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(held);
    });

    let report = engine
        .diagnose("My WiFi connection is unstable", false)
        .await
        .unwrap();
    release.await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.attempts.len(), 3);
}

struct BrokenRetriever;

impl KnowledgeRetriever for BrokenRetriever {
    fn name(&self) -> &str {
        "broken"
    }

    fn lookup<'a>(
        &'a self,
        _query: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async { Err::<String, _>(anyhow::anyhow!("index offline")) })
    }
}

#[tokio::test]
async fn knowledge_failure_becomes_a_warning() {
    let fake = Arc::new(FakeCommandRunner::healthy());
    let engine = Engine::builder()
        .runner(Arc::clone(&fake) as Arc<dyn CommandRunner>)
        .retriever(Arc::new(BrokenRetriever))
        .locks(Arc::new(InterfaceLocks::new()))
        .build()
        .unwrap();

    let report = engine
        .diagnose("My WiFi signal is very weak", false)
        .await
        .unwrap();

    assert_eq!(report.intent, Intent::Suggestion);
    assert!(report.knowledge.is_none());
    assert!(report.warnings.iter().any(|w| w.contains("index offline")));
    assert_eq!(report.recommendations.len(), 1);
}

#[tokio::test]
async fn failed_checks_are_reported_as_unknown() {
    let fake = Arc::new(FakeCommandRunner::healthy());
    fake.set(
        NetCommand::ActiveConnections,
        FakeResponse::error(CommandError::Unavailable("ss not found".into())),
    );
    let engine = engine_with(&fake, Config::default());

    let snapshot = engine.status(false).await;

    assert!(!snapshot.active_connections.is_known());
    assert!(snapshot.latency.is_known());
    assert!(snapshot.quality.is_known());
}
