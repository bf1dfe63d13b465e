use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A WiFi frequency band.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    #[strum(serialize = "2.4GHz")]
    #[serde(rename = "2.4ghz")]
    TwoPointFour,
    #[strum(serialize = "5GHz")]
    #[serde(rename = "5ghz")]
    Five,
}

impl Band {
    pub fn alternate(self) -> Self {
        match self {
            Self::TwoPointFour => Self::Five,
            Self::Five => Self::TwoPointFour,
        }
    }

    /// Classify a channel centre frequency. 6GHz and unknown ranges yield `None`.
    pub fn from_frequency_mhz(mhz: u32) -> Option<Self> {
        match mhz {
            2400..=2500 => Some(Self::TwoPointFour),
            4900..=5900 => Some(Self::Five),
            _ => None,
        }
    }
}

/// A named OS network operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(tag = "op", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NetCommand {
    Ping { host: String, count: u32 },
    ResolveHost { host: String },
    WifiStatus,
    ActiveConnections,
    DefaultRoute { ipv6: bool },
    ThroughputTest,
    TraceRoute { host: String },
    FlushDnsCache,
    RestartDnsService,
    RenewDhcpLease,
    RestartNetworkStack,
    ResetAdapter,
    SwitchBand { band: Band },
}

impl NetCommand {
    /// True for operations that change network configuration.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::FlushDnsCache
                | Self::RestartDnsService
                | Self::RenewDhcpLease
                | Self::RestartNetworkStack
                | Self::ResetAdapter
                | Self::SwitchBand { .. }
        )
    }

    /// Mutations need root on every supported platform.
    pub fn requires_privilege(&self) -> bool {
        self.is_mutating()
    }
}

/// Gap between ping probes, as passed to `ping -i`. Both iputils and BSD
/// ping accept half a second without root.
pub const PING_INTERVAL: &str = "0.5";

/// Hard wall-clock limit handed to `ping` for `count` probes: the half-second
/// send window plus one second for the last reply. Ping prints its loss
/// summary when the limit hits, so a dead link still yields a loss reading.
pub fn ping_deadline_secs(count: u32) -> u64 {
    u64::from(count.saturating_sub(1).div_ceil(2)) + 1
}

/// Raw result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Why a command produced no usable exit status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("failed to spawn: {0}")]
    Io(String),
}

impl CommandError {
    /// Timeouts and spawn hiccups may succeed on a second attempt; missing
    /// tools and missing privileges will not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }

    /// Whether a second attempt of `command` is safe after this error. A
    /// timed-out configuration change may still have been applied, so it is
    /// never repeated.
    pub fn is_retryable(&self, command: &NetCommand) -> bool {
        match self {
            Self::Timeout { .. } => !command.is_mutating(),
            other => other.is_transient(),
        }
    }
}
