use super::actions::{ActionCommand, ActionId, FixAction};
use super::registry::ActionRegistry;
use crate::config::RemediationConfig;
use crate::diagnostics::NetworkState;
use crate::intent::IssueTag;
use crate::runner::{CommandRunner, NetCommand};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Turns issue tags into an ordered, deduplicated, capped list of actions.
#[derive(Debug, Clone)]
pub struct Planner {
    registry: Arc<ActionRegistry>,
    disabled: HashSet<ActionId>,
    max_actions: usize,
}

impl Planner {
    pub fn new(registry: Arc<ActionRegistry>, config: &RemediationConfig) -> Self {
        Self {
            registry,
            disabled: config.disabled_actions.iter().copied().collect(),
            max_actions: config.max_actions,
        }
    }

    /// Plan for `tags` given the network state the collector observed.
    /// Actions the host cannot perform are dropped before ranking, so an
    /// empty plan means nothing can be attempted.
    pub fn plan(
        &self,
        tags: &BTreeSet<IssueTag>,
        state: &NetworkState,
        runner: &dyn CommandRunner,
    ) -> Vec<FixAction> {
        let mut seen = HashSet::new();
        let mut plan: Vec<FixAction> = tags
            .iter()
            .flat_map(|tag| self.registry.candidates(*tag))
            .filter(|action| seen.insert(action.id))
            .filter(|action| self.is_available(action, state, runner))
            .cloned()
            .collect();

        // Ties broken by id so the plan never depends on tag order.
        plan.sort_by_key(|a| (a.disruption_rank, a.id));
        if plan.len() > self.max_actions {
            let dropped: Vec<_> = plan[self.max_actions..].iter().map(|a| a.id).collect();
            tracing::info!(?dropped, cap = self.max_actions, "plan truncated");
            plan.truncate(self.max_actions);
        }
        plan
    }

    fn is_available(&self, action: &FixAction, state: &NetworkState, runner: &dyn CommandRunner) -> bool {
        if self.disabled.contains(&action.id) {
            return false;
        }
        match &action.command {
            ActionCommand::Single(command) => runner.supports(command),
            ActionCommand::BandComparison => state.connected
                && state.band.is_some_and(|band| {
                    runner.supports(&NetCommand::SwitchBand {
                        band: band.alternate(),
                    }) && runner.supports(&NetCommand::SwitchBand { band })
                        && runner.supports(&NetCommand::ThroughputTest)
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Band, FakeCommandRunner};

    fn planner(config: &RemediationConfig) -> Planner {
        Planner::new(Arc::new(ActionRegistry::builtin().unwrap()), config)
    }

    fn state(band: Option<Band>) -> NetworkState {
        NetworkState {
            interface: "wlan0".into(),
            connected: band.is_some(),
            ssid: band.map(|_| "Home".to_string()),
            band,
        }
    }

    fn tags(list: &[IssueTag]) -> BTreeSet<IssueTag> {
        list.iter().copied().collect()
    }

    fn ids(plan: &[FixAction]) -> Vec<ActionId> {
        plan.iter().map(|a| a.id).collect()
    }

    #[test]
    fn unstable_plan_in_disruption_order() {
        let fake = FakeCommandRunner::healthy();
        let plan = planner(&RemediationConfig::default()).plan(
            &tags(&[IssueTag::ConnectionUnstable]),
            &state(Some(Band::Five)),
            &fake,
        );
        assert_eq!(
            ids(&plan),
            vec![ActionId::FlushDns, ActionId::RestartNetworkStack, ActionId::ResetAdapter]
        );
    }

    #[test]
    fn union_has_no_duplicates_and_is_sorted() {
        let fake = FakeCommandRunner::healthy();
        let all = tags(&[
            IssueTag::ConnectionUnstable,
            IssueTag::DnsFailure,
            IssueTag::HighLatency,
            IssueTag::Unknown,
            IssueTag::WeakSignal,
        ]);
        let mut config = RemediationConfig::default();
        config.max_actions = 10;
        let plan = planner(&config).plan(&all, &state(Some(Band::TwoPointFour)), &fake);

        let unique: HashSet<_> = plan.iter().map(|a| a.id).collect();
        assert_eq!(unique.len(), plan.len());
        assert!(plan.windows(2).all(|w| w[0].disruption_rank <= w[1].disruption_rank));
        assert_eq!(plan.last().map(|a| a.id), Some(ActionId::BandSwitch));
    }

    #[test]
    fn cap_keeps_least_disruptive() {
        let fake = FakeCommandRunner::healthy();
        let mut config = RemediationConfig::default();
        config.max_actions = 2;
        let plan = planner(&config).plan(
            &tags(&[IssueTag::ConnectionUnstable, IssueTag::DnsFailure]),
            &state(Some(Band::Five)),
            &fake,
        );
        assert_eq!(ids(&plan), vec![ActionId::FlushDns, ActionId::RestartDnsService]);
    }

    #[test]
    fn weak_signal_alone_plans_nothing() {
        let fake = FakeCommandRunner::healthy();
        let plan = planner(&RemediationConfig::default()).plan(
            &tags(&[IssueTag::WeakSignal]),
            &state(Some(Band::Five)),
            &fake,
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn band_switch_needs_a_known_band() {
        let fake = FakeCommandRunner::healthy();
        let p = planner(&RemediationConfig::default());
        let latency = tags(&[IssueTag::HighLatency]);
        assert_eq!(
            ids(&p.plan(&latency, &state(Some(Band::Five)), &fake)),
            vec![ActionId::FlushDns, ActionId::BandSwitch]
        );
        assert_eq!(ids(&p.plan(&latency, &state(None), &fake)), vec![ActionId::FlushDns]);
    }

    #[test]
    fn unsupported_and_disabled_actions_are_dropped() {
        let fake = FakeCommandRunner::healthy();
        fake.mark_unsupported(NetCommand::ResetAdapter);
        let mut config = RemediationConfig::default();
        config.disabled_actions = vec![ActionId::FlushDns];
        let plan = planner(&config).plan(
            &tags(&[IssueTag::ConnectionUnstable]),
            &state(Some(Band::Five)),
            &fake,
        );
        assert_eq!(ids(&plan), vec![ActionId::RestartNetworkStack]);
    }
}
