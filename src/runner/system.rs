use super::platform::{self, BandProfiles};
use super::traits::CommandRunner;
use super::types::{CommandError, CommandOutput, NetCommand};
use crate::config::{Config, PlatformKind};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Maximum captured output size in bytes (64 KiB).
const MAX_OUTPUT_BYTES: usize = 65_536;
/// Environment variables passed to child processes.
/// Only functional variables are included -- never credentials.
const SAFE_ENV_VARS: &[&str] = &["PATH", "HOME", "TERM", "USER", "SHELL"];
/// Lower-cased stderr fragments that mean "you need root for this".
const PERMISSION_MARKERS: &[&str] = &[
    "a password is required",
    "permission denied",
    "operation not permitted",
    "not authorized",
    "must be root",
    "insufficient privileges",
];

/// Runs network operations with the host's own tools.
pub struct SystemCommandRunner {
    platform: PlatformKind,
    interface: String,
    use_sudo: bool,
    profiles: BandProfiles,
}

impl SystemCommandRunner {
    pub fn new(platform: PlatformKind, interface: impl Into<String>, use_sudo: bool) -> Self {
        Self {
            platform: platform.resolve(),
            interface: interface.into(),
            use_sudo,
            profiles: BandProfiles::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut runner = Self::new(
            config.network.platform,
            config.network.interface.clone(),
            config.network.use_sudo,
        );
        runner.profiles = BandProfiles {
            two_g: config.band.profile_2g.clone(),
            five_g: config.band.profile_5g.clone(),
        };
        runner
    }

    fn build_argv(&self, command: &NetCommand) -> Option<Vec<String>> {
        let argv = platform::argv(self.platform, command, &self.interface, &self.profiles)?;
        if self.use_sudo && command.requires_privilege() {
            let mut prefixed = vec!["sudo".to_string(), "-n".to_string()];
            prefixed.extend(argv);
            return Some(prefixed);
        }
        Some(argv)
    }

    async fn resolve_host(host: &str, timeout: Duration) -> Result<CommandOutput, CommandError> {
        let started = Instant::now();
        let lookup = tokio::net::lookup_host((host, 0));
        match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(mut addrs)) => {
                let first = addrs.next().map(|a| a.ip().to_string()).unwrap_or_default();
                Ok(CommandOutput::success(first).with_duration(started.elapsed()))
            }
            Ok(Err(e)) => {
                Ok(CommandOutput::failure(1, e.to_string()).with_duration(started.elapsed()))
            }
            Err(_) => Err(CommandError::Timeout { after: timeout }),
        }
    }

    async fn spawn(
        argv: Vec<String>,
        mutating: bool,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(CommandError::Unavailable("empty command".into()));
        };

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args).env_clear();
        for var in SAFE_ENV_VARS {
            if let Ok(val) = std::env::var(var) {
                cmd.env(var, val);
            }
        }
        // Stable, untranslated tool output for the parsers.
        cmd.env("LC_ALL", "C");
        // Killing a configuration change half-way could leave the interface down.
        cmd.kill_on_drop(!mutating);

        let started = Instant::now();
        let output = cmd.output();
        tokio::pin!(output);
        let result = match tokio::time::timeout(timeout, &mut output).await {
            Err(_) if mutating => {
                // The caller holds the interface lock for as long as this runs,
                // so the mutation must finish before the timeout is reported.
                tracing::warn!(
                    program = %program,
                    timeout_ms = timeout.as_millis(),
                    "mutating command overran its timeout, waiting for it to exit"
                );
                let late = output.await;
                tracing::debug!(
                    program = %program,
                    elapsed_ms = started.elapsed().as_millis(),
                    exit = ?late.as_ref().ok().and_then(|o| o.status.code()),
                    "overrun command exited"
                );
                return Err(CommandError::Timeout { after: timeout });
            }
            other => other,
        };

        match result {
            Ok(Ok(output)) => {
                let stdout = truncate(String::from_utf8_lossy(&output.stdout).to_string());
                let stderr = truncate(String::from_utf8_lossy(&output.stderr).to_string());
                let exit_code = output.status.code().unwrap_or(-1);

                if exit_code != 0 && is_permission_problem(&stderr) {
                    return Err(CommandError::PermissionDenied(stderr.trim().to_string()));
                }

                Ok(CommandOutput {
                    exit_code,
                    stdout,
                    stderr,
                    duration: started.elapsed(),
                })
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CommandError::Unavailable(format!("{program} not installed")))
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(CommandError::PermissionDenied(e.to_string()))
            }
            Ok(Err(e)) => Err(CommandError::Io(e.to_string())),
            Err(_) => Err(CommandError::Timeout { after: timeout }),
        }
    }
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_OUTPUT_BYTES {
        text.truncate(text.floor_char_boundary(MAX_OUTPUT_BYTES));
        text.push_str("\n... [output truncated at 64KiB]");
    }
    text
}

fn is_permission_problem(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    PERMISSION_MARKERS.iter().any(|marker| lower.contains(marker))
}

impl CommandRunner for SystemCommandRunner {
    fn name(&self) -> &str {
        "system"
    }

    fn run<'a>(
        &'a self,
        command: &'a NetCommand,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, CommandError>> + Send + 'a>> {
        Box::pin(async move {
            if let NetCommand::ResolveHost { host } = command {
                return Self::resolve_host(host, timeout).await;
            }

            let argv = self.build_argv(command).ok_or_else(|| {
                CommandError::Unavailable(format!(
                    "{command} is not supported on {}",
                    self.platform
                ))
            })?;
            tracing::debug!(command = %command, argv = ?argv, "running network command");
            Self::spawn(argv, command.is_mutating(), timeout).await
        })
    }

    fn supports(&self, command: &NetCommand) -> bool {
        matches!(command, NetCommand::ResolveHost { .. }) || self.build_argv(command).is_some()
    }
}
