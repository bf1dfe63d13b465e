use netmedic::RunOutcome;
use netmedic::intent::{Intent, IssueTag};
use netmedic::remediation::ActionId;
use netmedic::runner::fake::ping_output;
use netmedic::runner::{FakeResponse, NetCommand};

use crate::engine_harness::healthy_engine;

#[tokio::test]
async fn status_question_reports_connection_and_latency() {
    let (fake, engine) = healthy_engine();

    let report = engine
        .diagnose("What is my WiFi status?", false)
        .await
        .unwrap();

    assert_eq!(report.intent, Intent::StatusQuery);
    assert_eq!(report.status, "Connected to Home, latency 12ms");
    assert!(report.attempts.is_empty());
    assert!(report.plan.is_empty());
    assert!(report.after.is_none());
    assert_eq!(report.outcome, RunOutcome::NotAttempted);
    assert!(fake.mutations().is_empty());
}

#[tokio::test]
async fn weak_signal_is_answered_with_advice() {
    let (fake, engine) = healthy_engine();

    let report = engine
        .diagnose("My WiFi signal is very weak", false)
        .await
        .unwrap();

    assert_eq!(report.classification.intent, Intent::Fix);
    assert_eq!(report.intent, Intent::Suggestion);
    assert!(report.tags.contains(&IssueTag::WeakSignal));
    assert!(report.attempts.is_empty());
    let knowledge = report.knowledge.as_deref().unwrap_or_default();
    assert!(knowledge.contains("Improving WiFi signal strength"));
    assert_eq!(report.recommendations.len(), 1);
    assert!(fake.mutations().is_empty());
}

#[tokio::test]
async fn unstable_connection_runs_plan_in_disruption_order() {
    let (fake, engine) = healthy_engine();

    let report = engine
        .diagnose("My WiFi connection is unstable", false)
        .await
        .unwrap();

    assert_eq!(report.intent, Intent::Fix);
    assert_eq!(
        report.plan,
        vec![
            ActionId::FlushDns,
            ActionId::RestartNetworkStack,
            ActionId::ResetAdapter
        ]
    );
    assert_eq!(report.fixed().count(), 3);
    assert_eq!(report.failed().count(), 0);
    assert!(report.recommendations.is_empty());
    assert!(report.after.is_some());
    assert_eq!(report.outcome, RunOutcome::Completed);

    let sections = report.sections();
    assert_eq!(sections.fixed.len(), 3);
    assert!(sections.failed.is_empty());
    assert_eq!(fake.mutations().len(), 3);
}

#[tokio::test]
async fn generic_fix_request_plans_against_observed_issues() {
    let (fake, engine) = healthy_engine();
    fake.set(
        NetCommand::Ping {
            host: "8.8.8.8".into(),
            count: 4,
        },
        FakeResponse::ok(ping_output(20.0, 30.0, 45.0, 25)),
    );

    let report = engine.diagnose("please fix my internet", false).await.unwrap();

    assert_eq!(report.intent, Intent::Fix);
    assert!(report.tags.contains(&IssueTag::Unknown));
    assert!(report.tags.contains(&IssueTag::ConnectionUnstable));
    assert!(report.plan.contains(&ActionId::RestartNetworkStack));
    assert_eq!(report.plan.first(), Some(&ActionId::FlushDns));
}

#[tokio::test]
async fn how_to_question_gets_knowledge_without_fixes() {
    let (fake, engine) = healthy_engine();

    let report = engine
        .diagnose("How do I secure my router password?", false)
        .await
        .unwrap();

    assert_eq!(report.intent, Intent::Suggestion);
    assert!(
        report
            .knowledge
            .as_deref()
            .is_some_and(|k| k.contains("Securing a home network"))
    );
    assert!(report.attempts.is_empty());
    assert!(fake.mutations().is_empty());
}
