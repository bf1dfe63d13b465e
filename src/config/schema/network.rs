use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlatformKind {
    #[default]
    Auto,
    Linux,
    Macos,
}

impl PlatformKind {
    /// Resolve `Auto` against the host the binary was built for.
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto if cfg!(target_os = "macos") => Self::Macos,
            Self::Auto => Self::Linux,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Wireless interface the engine measures and repairs.
    #[serde(default = "default_interface")]
    pub interface: String,
    #[serde(default)]
    pub platform: PlatformKind,
    /// Prefix privileged commands with `sudo -n`.
    #[serde(default = "default_true")]
    pub use_sudo: bool,
    #[serde(default = "default_ping_host")]
    pub ping_host: String,
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,
    #[serde(default = "default_dns_hosts")]
    pub dns_hosts: Vec<String>,
    #[serde(default = "default_ping_host")]
    pub trace_host: String,
}

fn default_interface() -> String {
    "wlan0".into()
}

fn default_true() -> bool {
    true
}

fn default_ping_host() -> String {
    "8.8.8.8".into()
}

fn default_ping_count() -> u32 {
    4
}

fn default_dns_hosts() -> Vec<String> {
    vec![
        "google.com".into(),
        "cloudflare.com".into(),
        "github.com".into(),
    ]
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            platform: PlatformKind::default(),
            use_sudo: true,
            ping_host: default_ping_host(),
            ping_count: default_ping_count(),
            dns_hosts: default_dns_hosts(),
            trace_host: default_ping_host(),
        }
    }
}
