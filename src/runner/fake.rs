//! In-memory command runner for tests.
//!
//! Records every command it is asked to run and answers from scripted
//! responses. One-shot responses queued with [`FakeCommandRunner::push`] are
//! consumed first, then the sticky response registered with
//! [`FakeCommandRunner::set`]. A simulated WiFi link answers `WifiStatus` and
//! follows successful band switches, so band logic can be exercised end to end.

use super::traits::CommandRunner;
use super::types::{Band, CommandError, CommandOutput, NetCommand};
use crate::config::NetworkConfig;
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted answer.
#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub result: Result<CommandOutput, CommandError>,
    /// Wall-clock time the fake waits before answering.
    pub delay: Duration,
}

impl FakeResponse {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            result: Ok(CommandOutput::success(stdout)),
            delay: Duration::ZERO,
        }
    }

    pub fn exit(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            result: Ok(CommandOutput::failure(code, stderr)),
            delay: Duration::ZERO,
        }
    }

    pub fn error(error: CommandError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    /// Sleep for `delay` before answering; longer than the caller's timeout
    /// turns the answer into a timeout.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report `duration` as the measured command duration.
    pub fn took(mut self, duration: Duration) -> Self {
        if let Ok(output) = &mut self.result {
            output.duration = duration;
        }
        self
    }
}

#[derive(Debug, Clone)]
struct SimulatedLink {
    ssid: String,
    band: Band,
    signal_pct: u8,
}

#[derive(Default)]
pub struct FakeCommandRunner {
    queued: Mutex<HashMap<NetCommand, VecDeque<FakeResponse>>>,
    sticky: Mutex<HashMap<NetCommand, FakeResponse>>,
    unsupported: Mutex<HashSet<NetCommand>>,
    link: Mutex<Option<SimulatedLink>>,
    calls: Mutex<Vec<NetCommand>>,
}

impl FakeCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fast, healthy 5GHz link named "Home" answering every command the
    /// default configuration issues. Mutations succeed.
    pub fn healthy() -> Self {
        let net = NetworkConfig::default();
        let fake = Self::new();
        fake.simulate_link("Home", Band::Five, 80);
        fake.set(
            NetCommand::Ping {
                host: net.ping_host.clone(),
                count: net.ping_count,
            },
            FakeResponse::ok(ping_output(10.0, 12.0, 15.0, 0)),
        );
        for host in &net.dns_hosts {
            fake.set(
                NetCommand::ResolveHost { host: host.clone() },
                FakeResponse::ok("142.250.0.1").took(Duration::from_millis(15)),
            );
        }
        fake.set(
            NetCommand::ActiveConnections,
            FakeResponse::ok(
                "State  Recv-Q Send-Q Local Address:Port Peer Address:Port\n\
                 ESTAB  0      0      192.168.1.20:51234 140.82.112.4:443\n\
                 ESTAB  0      0      192.168.1.20:51240 142.250.0.1:443\n\
                 LISTEN 0      128    0.0.0.0:22         0.0.0.0:*\n",
            ),
        );
        fake.set(
            NetCommand::DefaultRoute { ipv6: false },
            FakeResponse::ok("default via 192.168.1.1 dev wlan0 proto dhcp metric 600\n"),
        );
        fake.set(NetCommand::DefaultRoute { ipv6: true }, FakeResponse::ok(""));
        fake.set(NetCommand::ThroughputTest, FakeResponse::ok(speedtest_output(95.0)));
        fake.set(
            NetCommand::TraceRoute {
                host: net.trace_host.clone(),
            },
            FakeResponse::ok(
                "traceroute to 8.8.8.8 (8.8.8.8), 15 hops max\n\
                 1  192.168.1.1  1.2 ms\n\
                 2  10.0.0.1  8.1 ms\n\
                 3  8.8.8.8  12.0 ms\n",
            ),
        );
        for command in [
            NetCommand::FlushDnsCache,
            NetCommand::RestartDnsService,
            NetCommand::RenewDhcpLease,
            NetCommand::RestartNetworkStack,
            NetCommand::ResetAdapter,
        ] {
            fake.set(command, FakeResponse::ok(""));
        }
        fake
    }

    /// Register the answer used whenever no one-shot response is queued.
    pub fn set(&self, command: NetCommand, response: FakeResponse) {
        if let Ok(mut sticky) = self.sticky.lock() {
            sticky.insert(command, response);
        }
    }

    /// Queue a one-shot answer, consumed before any sticky answer.
    pub fn push(&self, command: NetCommand, response: FakeResponse) {
        if let Ok(mut queued) = self.queued.lock() {
            queued.entry(command).or_default().push_back(response);
        }
    }

    /// Mark a command as impossible on this fake host.
    pub fn mark_unsupported(&self, command: NetCommand) {
        if let Ok(mut unsupported) = self.unsupported.lock() {
            unsupported.insert(command);
        }
    }

    pub fn simulate_link(&self, ssid: &str, band: Band, signal_pct: u8) {
        if let Ok(mut link) = self.link.lock() {
            *link = Some(SimulatedLink {
                ssid: ssid.to_string(),
                band,
                signal_pct,
            });
        }
    }

    /// Drop the simulated link; `WifiStatus` then needs a scripted answer.
    pub fn clear_link(&self) {
        if let Ok(mut link) = self.link.lock() {
            *link = None;
        }
    }

    pub fn current_band(&self) -> Option<Band> {
        self.link
            .lock()
            .ok()
            .and_then(|link| link.as_ref().map(|l| l.band))
    }

    /// Every command run so far, in call order.
    pub fn calls(&self) -> Vec<NetCommand> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, command: &NetCommand) -> usize {
        self.calls().iter().filter(|c| *c == command).count()
    }

    /// Configuration-changing commands run so far, in call order.
    pub fn mutations(&self) -> Vec<NetCommand> {
        self.calls()
            .into_iter()
            .filter(NetCommand::is_mutating)
            .collect()
    }

    fn next_response(&self, command: &NetCommand) -> Option<FakeResponse> {
        let queued = self
            .queued
            .lock()
            .ok()
            .and_then(|mut q| q.get_mut(command).and_then(VecDeque::pop_front));
        if queued.is_some() {
            return queued;
        }
        let sticky = self
            .sticky
            .lock()
            .ok()
            .and_then(|s| s.get(command).cloned());
        if sticky.is_some() {
            return sticky;
        }

        let link = self.link.lock().ok().and_then(|l| l.clone())?;
        match command {
            NetCommand::WifiStatus => Some(FakeResponse::ok(nmcli_wifi_line(
                &link.ssid,
                link.signal_pct,
                frequency_for(link.band),
            ))),
            NetCommand::SwitchBand { .. } => Some(FakeResponse::ok("")),
            _ => None,
        }
    }

    fn apply_side_effects(&self, command: &NetCommand, response: &FakeResponse) {
        let NetCommand::SwitchBand { band } = command else {
            return;
        };
        let succeeded = matches!(&response.result, Ok(output) if output.succeeded());
        if succeeded
            && let Ok(mut guard) = self.link.lock()
            && let Some(link) = guard.as_mut()
        {
            link.band = *band;
        }
    }
}

impl CommandRunner for FakeCommandRunner {
    fn name(&self) -> &str {
        "fake"
    }

    fn run<'a>(
        &'a self,
        command: &'a NetCommand,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, CommandError>> + Send + 'a>> {
        Box::pin(async move {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(command.clone());
            }

            if !self.supports(command) {
                return Err(CommandError::Unavailable(format!(
                    "{command} unsupported on fake host"
                )));
            }

            let Some(response) = self.next_response(command) else {
                return Err(CommandError::Unavailable(format!(
                    "no scripted response for {command}"
                )));
            };

            if response.delay > timeout {
                tokio::time::sleep(timeout).await;
                return Err(CommandError::Timeout { after: timeout });
            }
            if !response.delay.is_zero() {
                tokio::time::sleep(response.delay).await;
            }

            self.apply_side_effects(command, &response);
            response.result
        })
    }

    fn supports(&self, command: &NetCommand) -> bool {
        self.unsupported
            .lock()
            .map(|u| !u.contains(command))
            .unwrap_or(true)
    }
}

fn frequency_for(band: Band) -> u32 {
    match band {
        Band::TwoPointFour => 2437,
        Band::Five => 5180,
    }
}

/// Linux `ping` output with the given summary values.
pub fn ping_output(min_ms: f64, avg_ms: f64, max_ms: f64, loss_pct: u32) -> String {
    let received = 4 - (4 * loss_pct / 100).min(4);
    format!(
        "PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.\n\
         \n\
         --- 8.8.8.8 ping statistics ---\n\
         4 packets transmitted, {received} received, {loss_pct}% packet loss, time 3004ms\n\
         rtt min/avg/max/mdev = {min_ms:.3}/{avg_ms:.3}/{max_ms:.3}/1.204 ms\n"
    )
}

/// `nmcli -t -f ACTIVE,SSID,SIGNAL,FREQ dev wifi` output with one active row.
pub fn nmcli_wifi_line(ssid: &str, signal_pct: u8, frequency_mhz: u32) -> String {
    format!("no:Neighbour:40:2412 MHz\nyes:{ssid}:{signal_pct}:{frequency_mhz} MHz\n")
}

/// `speedtest-cli --simple` output.
pub fn speedtest_output(download_mbps: f64) -> String {
    format!("Ping: 14.2 ms\nDownload: {download_mbps:.2} Mbit/s\nUpload: 11.80 Mbit/s\n")
}
