use std::sync::Arc;

use netmedic::intent::IssueTag;
use netmedic::remediation::{ActionId, ActionRegistry, FixAction};
use netmedic::runner::{CommandRunner, FakeCommandRunner};
use netmedic::{Config, Engine, EngineError};

#[test]
fn engine_without_runner_is_rejected() {
    let err = Engine::builder().config(Config::default()).build().err();
    assert!(matches!(err, Some(EngineError::MissingCollaborator(_))));
}

#[test]
fn registry_mapping_to_unknown_action_is_rejected() {
    let err = ActionRegistry::new(
        vec![FixAction::flush_dns()],
        vec![(IssueTag::DnsFailure, vec![ActionId::FlushDns, ActionId::RenewDhcp])],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Registry(_)));
    assert!(err.to_string().contains("renew_dhcp"));
}

#[test]
fn duplicate_action_ids_are_rejected() {
    let err = ActionRegistry::new(
        vec![FixAction::flush_dns(), FixAction::flush_dns()],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Registry(_)));
}

#[test]
fn unknown_action_in_rank_overrides_is_rejected() {
    let mut config = Config::default();
    config
        .remediation
        .disruption_ranks
        .insert("reboot_router".into(), 5);

    let err = Engine::builder()
        .config(config)
        .runner(Arc::new(FakeCommandRunner::healthy()) as Arc<dyn CommandRunner>)
        .build()
        .err();
    assert!(matches!(err, Some(EngineError::Registry(_))));
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.remediation.max_actions = 0;

    let err = Engine::builder()
        .config(config)
        .runner(Arc::new(FakeCommandRunner::healthy()) as Arc<dyn CommandRunner>)
        .build()
        .err();
    assert!(matches!(err, Some(EngineError::Config(_))));
}

#[tokio::test]
async fn rank_override_reorders_the_plan() {
    let mut config = Config::default();
    config
        .remediation
        .disruption_ranks
        .insert("reset_adapter".into(), 1);
    let fake = Arc::new(FakeCommandRunner::healthy());
    let engine = crate::engine_harness::engine_with(&fake, config);

    let preview = engine.plan("My WiFi connection is unstable").await;

    assert_eq!(preview.actions.first().map(|a| a.id), Some(ActionId::ResetAdapter));
    assert!(fake.mutations().is_empty());
}
