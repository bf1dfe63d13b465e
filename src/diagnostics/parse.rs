//! Parsers for the text the host's network tools print.

use super::types::{LatencyStats, WifiLink};
use crate::runner::Band;
use regex::Regex;
use std::sync::LazyLock;

static RTT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:rtt|round-trip) min/avg/max/(?:mdev|stddev) = ([\d.]+)/([\d.]+)/([\d.]+)/")
        .expect("valid rtt regex")
});
static LOSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+)% packet loss").expect("valid loss regex"));
static GATEWAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^default via (\S+)|^\s*gateway:\s*(\S+))").expect("valid gateway regex")
});
static DOWNLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Download:\s*([\d.]+)\s*Mbit/s").expect("valid download regex")
});
static HOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(\d+)\s").expect("valid hop regex"));

/// Summary of a `ping` run. Either half may be missing: a run with 100% loss
/// prints a loss line but no round-trip line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingSummary {
    pub latency: Option<LatencyStats>,
    pub loss_pct: Option<f64>,
}

pub fn parse_ping(output: &str) -> PingSummary {
    let latency = RTT_RE.captures(output).and_then(|caps| {
        Some(LatencyStats {
            min_ms: caps[1].parse().ok()?,
            avg_ms: caps[2].parse().ok()?,
            max_ms: caps[3].parse().ok()?,
        })
    });
    let loss_pct = LOSS_RE
        .captures(output)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    PingSummary { latency, loss_pct }
}

/// nmcli reports signal as a percentage; map it onto the usual dBm range.
pub fn signal_pct_to_dbm(pct: u8) -> i32 {
    i32::from(pct.min(100)) / 2 - 100
}

/// Parse WiFi link state from `nmcli -t -f ACTIVE,SSID,SIGNAL,FREQ dev wifi`
/// or macOS `networksetup -getairportnetwork`. `None` means the output was
/// not recognised at all.
pub fn parse_wifi_status(output: &str) -> Option<WifiLink> {
    let trimmed = output.trim();

    if let Some(rest) = trimmed.strip_prefix("Current Wi-Fi Network:") {
        let ssid = rest.trim();
        return Some(WifiLink {
            connected: true,
            ssid: (!ssid.is_empty()).then(|| ssid.to_string()),
            signal_dbm: None,
            band: None,
            frequency_mhz: None,
        });
    }
    if trimmed.contains("not associated with an AirPort network") {
        return Some(WifiLink::disconnected());
    }

    let mut saw_nmcli_row = false;
    for line in trimmed.lines() {
        let Some((active, rest)) = line.split_once(':') else {
            continue;
        };
        if active != "yes" && active != "no" {
            continue;
        }
        saw_nmcli_row = true;
        if active != "yes" {
            continue;
        }
        // SSID may contain escaped colons, so split the numeric fields off the right.
        let mut fields = rest.rsplitn(3, ':');
        let freq_field = fields.next().unwrap_or_default();
        let signal_field = fields.next().unwrap_or_default();
        let ssid_field = fields.next().unwrap_or_default();

        let frequency_mhz = freq_field
            .split_whitespace()
            .next()
            .and_then(|f| f.parse::<u32>().ok());
        let ssid = ssid_field.replace("\\:", ":");
        return Some(WifiLink {
            connected: true,
            ssid: (!ssid.is_empty()).then_some(ssid),
            signal_dbm: signal_field.trim().parse::<u8>().ok().map(signal_pct_to_dbm),
            band: frequency_mhz.and_then(Band::from_frequency_mhz),
            frequency_mhz,
        });
    }

    if saw_nmcli_row || trimmed.is_empty() {
        Some(WifiLink::disconnected())
    } else {
        None
    }
}

/// Count established TCP connections in `ss -tan` or `netstat -an` output.
pub fn count_established(output: &str) -> u32 {
    let count = output.lines().filter(|l| l.contains("ESTAB")).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Default gateway from `ip route show default` or `route -n get default`.
pub fn parse_default_gateway(output: &str) -> Option<String> {
    GATEWAY_RE.captures(output).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    })
}

/// Download rate from `speedtest-cli --simple`.
pub fn parse_download_mbps(output: &str) -> Option<f64> {
    DOWNLOAD_RE
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
}

/// Number of the last hop printed by `traceroute`.
pub fn parse_hop_count(output: &str) -> Option<u32> {
    HOP_RE
        .captures_iter(output)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .last()
}
