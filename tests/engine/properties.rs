use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use netmedic::Config;
use netmedic::config::RemediationConfig;
use netmedic::diagnostics::NetworkState;
use netmedic::intent::{Intent, IssueTag};
use netmedic::remediation::{ActionRegistry, Planner};
use netmedic::runner::fake::ping_output;
use netmedic::runner::{Band, FakeCommandRunner, FakeResponse, NetCommand};

use crate::engine_harness::{engine_with, healthy_engine};

#[tokio::test]
async fn status_queries_never_touch_the_network_configuration() {
    let (fake, engine) = healthy_engine();

    for query in [
        "What is my WiFi status?",
        "am I connected",
        "what is my ping",
        "show me the network name and ip address",
    ] {
        let report = engine.diagnose(query, false).await.unwrap();
        assert_eq!(report.intent, Intent::StatusQuery, "query: {query}");
        assert!(report.attempts.is_empty(), "query: {query}");
    }
    assert!(fake.mutations().is_empty());
}

#[test]
fn plans_have_no_duplicates_and_follow_disruption_rank() {
    let planner = Planner::new(
        Arc::new(ActionRegistry::builtin().unwrap()),
        &RemediationConfig::default(),
    );
    let fake = FakeCommandRunner::healthy();
    let state = NetworkState {
        interface: "wlan0".into(),
        connected: true,
        ssid: Some("Home".into()),
        band: Some(Band::TwoPointFour),
    };
    let all = [
        IssueTag::ConnectionUnstable,
        IssueTag::HighLatency,
        IssueTag::WeakSignal,
        IssueTag::DnsFailure,
        IssueTag::Unknown,
    ];

    // Every subset of the tag set.
    for mask in 0u32..(1 << all.len()) {
        let tags: BTreeSet<IssueTag> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, t)| *t)
            .collect();
        let plan = planner.plan(&tags, &state, &fake);

        let ids: HashSet<_> = plan.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), plan.len(), "duplicates for {tags:?}");
        assert!(
            plan.windows(2)
                .all(|w| w[0].disruption_rank <= w[1].disruption_rank),
            "rank order broken for {tags:?}"
        );
        assert!(plan.len() <= RemediationConfig::default().max_actions);
    }
}

#[tokio::test]
async fn repeating_an_idempotent_fix_is_harmless() {
    let (fake, engine) = healthy_engine();

    let first = engine.diagnose("dns lookups fail", false).await.unwrap();
    let second = engine.diagnose("dns lookups fail", false).await.unwrap();

    for report in [&first, &second] {
        let flush = report
            .attempts
            .iter()
            .find(|a| a.action_id == netmedic::remediation::ActionId::FlushDns)
            .expect("flush attempted");
        assert!(flush.success);
        assert!(flush.error.is_none());
    }
    assert_eq!(fake.call_count(&NetCommand::FlushDnsCache), 2);
}

#[tokio::test]
async fn quality_falls_as_packet_loss_rises() {
    let mut previous = f64::INFINITY;
    for loss in [0, 10, 25, 50] {
        let fake = Arc::new(FakeCommandRunner::healthy());
        fake.set(
            NetCommand::Ping {
                host: "8.8.8.8".into(),
                count: 4,
            },
            FakeResponse::ok(ping_output(10.0, 12.0, 15.0, loss)),
        );
        let snapshot = engine_with(&fake, Config::default()).status(false).await;
        let score = snapshot.quality.value().expect("score measured").value;
        assert!(score <= previous, "loss {loss}% raised the score");
        previous = score;
    }
}

#[tokio::test]
async fn quality_rises_with_signal_strength() {
    let mut previous = f64::NEG_INFINITY;
    for signal_pct in [20, 40, 60, 80, 100] {
        let fake = Arc::new(FakeCommandRunner::healthy());
        fake.simulate_link("Home", Band::Five, signal_pct);
        let snapshot = engine_with(&fake, Config::default()).status(false).await;
        let score = snapshot.quality.value().expect("score measured").value;
        assert!(score >= previous, "signal {signal_pct}% lowered the score");
        previous = score;
    }
}
