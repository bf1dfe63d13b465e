use crate::remediation::ActionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// What a second remediation run does when the interface is already being
/// repaired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LockMode {
    /// Wait up to `lock_wait_secs` for the running repair to finish.
    #[default]
    Wait,
    /// Give up immediately with a "remediation in progress" outcome.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationConfig {
    /// Upper bound on fix actions attempted per request.
    #[serde(default = "default_max_actions")]
    pub max_actions: usize,
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,
    /// Overall deadline for one diagnose-and-fix request.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default)]
    pub lock_mode: LockMode,
    #[serde(default = "default_lock_wait_secs")]
    pub lock_wait_secs: u64,
    /// Actions never planned on this host.
    #[serde(default)]
    pub disabled_actions: Vec<ActionId>,
    /// Overrides for the built-in disruption ranks, keyed by action id.
    #[serde(default)]
    pub disruption_ranks: BTreeMap<String, u8>,
}

fn default_max_actions() -> usize {
    5
}

fn default_action_timeout_secs() -> u64 {
    20
}

fn default_deadline_secs() -> u64 {
    60
}

fn default_lock_wait_secs() -> u64 {
    10
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            max_actions: default_max_actions(),
            action_timeout_secs: default_action_timeout_secs(),
            deadline_secs: default_deadline_secs(),
            lock_mode: LockMode::default(),
            lock_wait_secs: default_lock_wait_secs(),
            disabled_actions: Vec::new(),
            disruption_ranks: BTreeMap::new(),
        }
    }
}

impl RemediationConfig {
    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_secs(self.lock_wait_secs)
    }
}
