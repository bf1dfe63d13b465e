use super::actions::{ActionId, FixAction};
use crate::error::EngineError;
use crate::intent::IssueTag;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Static mapping from issue tag to the fix actions that address it.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    actions: BTreeMap<ActionId, FixAction>,
    mappings: BTreeMap<IssueTag, Vec<ActionId>>,
}

impl ActionRegistry {
    /// Build a registry, rejecting duplicate actions and mappings that name
    /// an action that was never registered. Each action's `addresses` set is
    /// derived from the mappings.
    pub fn new(
        actions: Vec<FixAction>,
        mappings: Vec<(IssueTag, Vec<ActionId>)>,
    ) -> Result<Self, EngineError> {
        let mut by_id = BTreeMap::new();
        for mut action in actions {
            action.addresses.clear();
            let id = action.id;
            if by_id.insert(id, action).is_some() {
                return Err(EngineError::Registry(format!("duplicate action id {id}")));
            }
        }

        let mut table: BTreeMap<IssueTag, Vec<ActionId>> = BTreeMap::new();
        for (tag, ids) in mappings {
            let entry = table.entry(tag).or_default();
            for id in ids {
                let action = by_id.get_mut(&id).ok_or_else(|| {
                    EngineError::Registry(format!("tag {tag} maps to unregistered action {id}"))
                })?;
                action.addresses.insert(tag);
                if !entry.contains(&id) {
                    entry.push(id);
                }
            }
        }

        Ok(Self {
            actions: by_id,
            mappings: table,
        })
    }

    /// The built-in registry. Weak signal has no automatic fix; it is
    /// answered with advice.
    pub fn builtin() -> Result<Self, EngineError> {
        use ActionId::{
            BandSwitch, FlushDns, RenewDhcp, ResetAdapter, RestartDnsService, RestartNetworkStack,
        };
        Self::new(
            vec![
                FixAction::flush_dns(),
                FixAction::restart_dns_service(),
                FixAction::renew_dhcp(),
                FixAction::restart_network_stack(),
                FixAction::reset_adapter(),
                FixAction::band_switch(),
            ],
            vec![
                (
                    IssueTag::ConnectionUnstable,
                    vec![FlushDns, RestartNetworkStack, ResetAdapter],
                ),
                (IssueTag::DnsFailure, vec![FlushDns, RestartDnsService, RenewDhcp]),
                (IssueTag::HighLatency, vec![FlushDns, BandSwitch]),
                (IssueTag::Unknown, vec![FlushDns, RenewDhcp]),
            ],
        )
    }

    /// Apply configured rank overrides keyed by action id text.
    pub fn with_rank_overrides(mut self, ranks: &BTreeMap<String, u8>) -> Result<Self, EngineError> {
        for (key, rank) in ranks {
            let id = ActionId::from_str(key)
                .map_err(|_| EngineError::Registry(format!("unknown action in rank table: {key}")))?;
            let action = self.actions.get_mut(&id).ok_or_else(|| {
                EngineError::Registry(format!("rank given for unregistered action {id}"))
            })?;
            action.disruption_rank = *rank;
        }
        Ok(self)
    }

    pub fn get(&self, id: ActionId) -> Option<&FixAction> {
        self.actions.get(&id)
    }

    pub fn actions(&self) -> impl Iterator<Item = &FixAction> {
        self.actions.values()
    }

    /// Actions mapped to `tag`, in registration order.
    pub fn candidates(&self, tag: IssueTag) -> impl Iterator<Item = &FixAction> {
        self.mappings
            .get(&tag)
            .into_iter()
            .flatten()
            .filter_map(|id| self.actions.get(id))
    }

    /// Tags with at least one mapped action.
    pub fn mapped_tags(&self) -> BTreeSet<IssueTag> {
        self.mappings
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(tag, _)| *tag)
            .collect()
    }
}
