use super::types::{CommandError, CommandOutput, NetCommand};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Executes named network operations on the host.
pub trait CommandRunner: Send + Sync {
    /// Short name used in logs ("system", "fake").
    fn name(&self) -> &str;

    /// Run `command`, giving up after `timeout`.
    ///
    /// A non-zero exit status is returned as `Ok` with the exit code set;
    /// `Err` is reserved for commands that never produced a status.
    fn run<'a>(
        &'a self,
        command: &'a NetCommand,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, CommandError>> + Send + 'a>>;

    /// Whether this runner can perform `command` at all on this host.
    fn supports(&self, _command: &NetCommand) -> bool {
        true
    }
}
