use crate::diagnostics::Reading;
use crate::intent::IssueTag;
use crate::runner::{Band, NetCommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Stable identifier of a fix action.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionId {
    FlushDns,
    RestartDnsService,
    RenewDhcp,
    RestartNetworkStack,
    ResetAdapter,
    BandSwitch,
}

/// How an action is carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "command", rename_all = "snake_case")]
pub enum ActionCommand {
    /// One runner command.
    Single(NetCommand),
    /// The two-phase throughput comparison between bands.
    BandComparison,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixAction {
    pub id: ActionId,
    pub addresses: BTreeSet<IssueTag>,
    pub command: ActionCommand,
    pub requires_elevated_privilege: bool,
    /// Safe to run twice; only idempotent actions are retried.
    pub idempotent: bool,
    /// Ordering key; lower ranks disturb the connection less.
    pub disruption_rank: u8,
}

impl FixAction {
    fn single(id: ActionId, command: NetCommand, idempotent: bool, rank: u8) -> Self {
        Self {
            id,
            addresses: BTreeSet::new(),
            requires_elevated_privilege: command.requires_privilege(),
            command: ActionCommand::Single(command),
            idempotent,
            disruption_rank: rank,
        }
    }

    pub fn flush_dns() -> Self {
        Self::single(ActionId::FlushDns, NetCommand::FlushDnsCache, true, 10)
    }

    pub fn restart_dns_service() -> Self {
        Self::single(ActionId::RestartDnsService, NetCommand::RestartDnsService, true, 15)
    }

    pub fn renew_dhcp() -> Self {
        Self::single(ActionId::RenewDhcp, NetCommand::RenewDhcpLease, true, 20)
    }

    pub fn restart_network_stack() -> Self {
        Self::single(ActionId::RestartNetworkStack, NetCommand::RestartNetworkStack, false, 30)
    }

    pub fn reset_adapter() -> Self {
        Self::single(ActionId::ResetAdapter, NetCommand::ResetAdapter, false, 40)
    }

    pub fn band_switch() -> Self {
        Self {
            id: ActionId::BandSwitch,
            addresses: BTreeSet::new(),
            command: ActionCommand::BandComparison,
            requires_elevated_privilege: true,
            idempotent: false,
            disruption_rank: 50,
        }
    }
}

/// Why an action did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionErrorKind {
    PermissionDenied,
    Timeout,
    /// Non-zero exit, missing tool, or an incomplete band comparison.
    Failed,
}

/// Outcome of the two-band throughput comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandComparison {
    pub original_band: Band,
    pub alternate_band: Band,
    pub original_mbps: Reading<f64>,
    pub alternate_mbps: Reading<f64>,
    /// Band the device was left on; `None` only when neither band could be
    /// confirmed after a failed restore.
    pub final_band: Option<Band>,
    pub switched: bool,
    pub threshold_pct: f64,
}

/// Outcome of one executed action. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixAttemptResult {
    pub action_id: ActionId,
    pub success: bool,
    pub message: String,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub error: Option<ActionErrorKind>,
    pub retried: bool,
    pub band_comparison: Option<BandComparison>,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
