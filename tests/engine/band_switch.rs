use std::sync::Arc;

use netmedic::Config;
use netmedic::diagnostics::Reading;
use netmedic::remediation::{ActionErrorKind, ActionId};
use netmedic::runner::fake::speedtest_output;
use netmedic::runner::{Band, FakeCommandRunner, FakeResponse, NetCommand};

use crate::engine_harness::engine_with;

fn on_two_point_four() -> Arc<FakeCommandRunner> {
    let fake = Arc::new(FakeCommandRunner::healthy());
    fake.simulate_link("Home", Band::TwoPointFour, 70);
    fake
}

#[tokio::test]
async fn faster_five_ghz_band_is_kept() {
    let fake = on_two_point_four();
    fake.push(NetCommand::ThroughputTest, FakeResponse::ok(speedtest_output(42.0)));
    fake.push(NetCommand::ThroughputTest, FakeResponse::ok(speedtest_output(87.0)));
    let engine = engine_with(&fake, Config::default());

    let report = engine.diagnose("my wifi is so slow", false).await.unwrap();

    assert_eq!(report.plan, vec![ActionId::FlushDns, ActionId::BandSwitch]);
    let attempt = report
        .attempts
        .iter()
        .find(|a| a.action_id == ActionId::BandSwitch)
        .expect("band switch attempted");
    assert!(attempt.success);
    let comparison = attempt.band_comparison.as_ref().expect("comparison recorded");
    assert_eq!(comparison.original_band, Band::TwoPointFour);
    assert_eq!(comparison.original_mbps, Reading::Measured(42.0));
    assert_eq!(comparison.alternate_mbps, Reading::Measured(87.0));
    assert_eq!(comparison.final_band, Some(Band::Five));
    assert!(comparison.switched);
    assert!(attempt.message.contains("switched to 5GHz"));

    assert_eq!(fake.current_band(), Some(Band::Five));
    let after = report.after.as_ref().expect("after snapshot");
    assert_eq!(after.band(), Some(Band::Five));
}

#[tokio::test]
async fn gain_inside_noise_threshold_returns_to_original_band() {
    let fake = on_two_point_four();
    fake.push(NetCommand::ThroughputTest, FakeResponse::ok(speedtest_output(50.0)));
    fake.push(NetCommand::ThroughputTest, FakeResponse::ok(speedtest_output(51.0)));
    let engine = engine_with(&fake, Config::default());

    let report = engine.diagnose("my wifi is so slow", false).await.unwrap();

    let attempt = report
        .attempts
        .iter()
        .find(|a| a.action_id == ActionId::BandSwitch)
        .expect("band switch attempted");
    assert!(attempt.success);
    let comparison = attempt.band_comparison.as_ref().unwrap();
    assert!(!comparison.switched);
    assert_eq!(comparison.final_band, Some(Band::TwoPointFour));
    assert_eq!(fake.current_band(), Some(Band::TwoPointFour));
}

#[tokio::test]
async fn failed_second_measurement_leaves_device_on_a_band() {
    let fake = on_two_point_four();
    fake.push(NetCommand::ThroughputTest, FakeResponse::ok(speedtest_output(42.0)));
    fake.push(
        NetCommand::ThroughputTest,
        FakeResponse::exit(1, "Cannot retrieve speedtest configuration"),
    );
    let engine = engine_with(&fake, Config::default());

    let report = engine.diagnose("my wifi is so slow", false).await.unwrap();

    let attempt = report
        .attempts
        .iter()
        .find(|a| a.action_id == ActionId::BandSwitch)
        .expect("band switch attempted");
    assert!(!attempt.success);
    assert_eq!(attempt.error, Some(ActionErrorKind::Failed));
    let comparison = attempt.band_comparison.as_ref().unwrap();
    assert_eq!(comparison.original_mbps, Reading::Measured(42.0));
    assert!(!comparison.alternate_mbps.is_known());
    assert_eq!(comparison.final_band, Some(Band::TwoPointFour));
    assert_eq!(fake.current_band(), Some(Band::TwoPointFour));
}

#[tokio::test]
async fn band_switch_is_not_planned_when_switching_is_unsupported() {
    let fake = on_two_point_four();
    fake.mark_unsupported(NetCommand::SwitchBand { band: Band::Five });
    let engine = engine_with(&fake, Config::default());

    let preview = engine.plan("my wifi is so slow").await;

    assert_eq!(
        preview.actions.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![ActionId::FlushDns]
    );
    assert!(fake.mutations().is_empty());
}
