use super::types::{Band, NetCommand, PING_INTERVAL, ping_deadline_secs};
use crate::config::PlatformKind;

/// Connection profiles used to join each band.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BandProfiles {
    pub two_g: String,
    pub five_g: String,
}

impl BandProfiles {
    fn for_band(&self, band: Band) -> Option<&str> {
        let profile = match band {
            Band::TwoPointFour => self.two_g.as_str(),
            Band::Five => self.five_g.as_str(),
        };
        (!profile.trim().is_empty()).then_some(profile)
    }
}

fn owned(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| (*p).to_string()).collect()
}

/// Build the argv for `command`. `None` means the operation has no
/// equivalent on this platform (or, for band switches, no profile is
/// configured). Host resolution is performed natively and has no argv.
pub(crate) fn argv(
    platform: PlatformKind,
    command: &NetCommand,
    interface: &str,
    profiles: &BandProfiles,
) -> Option<Vec<String>> {
    match platform.resolve() {
        PlatformKind::Macos => macos_argv(command, interface, profiles),
        _ => linux_argv(command, interface, profiles),
    }
}

fn linux_argv(command: &NetCommand, iface: &str, profiles: &BandProfiles) -> Option<Vec<String>> {
    let argv = match command {
        NetCommand::Ping { host, count } => {
            let deadline = ping_deadline_secs(*count).to_string();
            let count = count.to_string();
            owned(&[
                "ping", "-c", &count, "-i", PING_INTERVAL, "-W", "1", "-w", &deadline, host,
            ])
        }
        NetCommand::ResolveHost { .. } => return None,
        NetCommand::WifiStatus => owned(&["nmcli", "-t", "-f", "ACTIVE,SSID,SIGNAL,FREQ", "dev", "wifi"]),
        NetCommand::ActiveConnections => owned(&["ss", "-tan"]),
        NetCommand::DefaultRoute { ipv6: false } => owned(&["ip", "route", "show", "default"]),
        NetCommand::DefaultRoute { ipv6: true } => owned(&["ip", "-6", "route", "show", "default"]),
        NetCommand::ThroughputTest => owned(&["speedtest-cli", "--simple"]),
        NetCommand::TraceRoute { host } => owned(&["traceroute", "-m", "15", "-w", "2", host]),
        NetCommand::FlushDnsCache => owned(&["resolvectl", "flush-caches"]),
        NetCommand::RestartDnsService => owned(&["systemctl", "restart", "systemd-resolved"]),
        NetCommand::RenewDhcpLease => owned(&["dhclient", "-1", iface]),
        NetCommand::RestartNetworkStack => owned(&["systemctl", "restart", "NetworkManager"]),
        NetCommand::ResetAdapter => {
            let script = format!("ip link set {iface} down && ip link set {iface} up");
            owned(&["sh", "-c", &script])
        }
        NetCommand::SwitchBand { band } => {
            let profile = profiles.for_band(*band)?;
            owned(&["nmcli", "connection", "up", profile, "ifname", iface])
        }
    };
    Some(argv)
}

fn macos_argv(command: &NetCommand, iface: &str, profiles: &BandProfiles) -> Option<Vec<String>> {
    let argv = match command {
        NetCommand::Ping { host, count } => {
            let deadline = ping_deadline_secs(*count).to_string();
            let count = count.to_string();
            owned(&["ping", "-c", &count, "-i", PING_INTERVAL, "-t", &deadline, host])
        }
        NetCommand::ResolveHost { .. } => return None,
        NetCommand::WifiStatus => owned(&["networksetup", "-getairportnetwork", iface]),
        NetCommand::ActiveConnections => owned(&["netstat", "-an", "-p", "tcp"]),
        NetCommand::DefaultRoute { ipv6: false } => owned(&["route", "-n", "get", "default"]),
        NetCommand::DefaultRoute { ipv6: true } => {
            owned(&["route", "-n", "get", "-inet6", "default"])
        }
        NetCommand::ThroughputTest => owned(&["speedtest-cli", "--simple"]),
        NetCommand::TraceRoute { host } => owned(&["traceroute", "-m", "15", "-w", "2", host]),
        NetCommand::FlushDnsCache => owned(&["dscacheutil", "-flushcache"]),
        NetCommand::RestartDnsService => owned(&["killall", "-HUP", "mDNSResponder"]),
        NetCommand::RenewDhcpLease => owned(&["ipconfig", "set", iface, "DHCP"]),
        NetCommand::RestartNetworkStack => {
            let script = format!(
                "networksetup -setairportpower {iface} off && networksetup -setairportpower {iface} on"
            );
            owned(&["sh", "-c", &script])
        }
        NetCommand::ResetAdapter => {
            let script = format!("ifconfig {iface} down && ifconfig {iface} up");
            owned(&["sh", "-c", &script])
        }
        NetCommand::SwitchBand { band } => {
            let profile = profiles.for_band(*band)?;
            owned(&["networksetup", "-setairportnetwork", iface, profile])
        }
    };
    Some(argv)
}
