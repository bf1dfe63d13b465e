use crate::config::LockMode;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

static GLOBAL: LazyLock<Arc<InterfaceLocks>> = LazyLock::new(|| Arc::new(InterfaceLocks::new()));

/// Another remediation run holds the interface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("remediation already in progress on {interface}")]
pub struct LockContention {
    pub interface: String,
}

/// Held for the whole remediation run; dropping it releases the interface.
#[derive(Debug)]
pub struct InterfaceGuard {
    interface: String,
    _guard: OwnedMutexGuard<()>,
}

impl InterfaceGuard {
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl Drop for InterfaceGuard {
    fn drop(&mut self) {
        tracing::debug!(interface = %self.interface, "interface lock released");
    }
}

/// One execution lock per network interface.
#[derive(Debug, Default)]
pub struct InterfaceLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl InterfaceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide lock table shared by every engine.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    fn slot(&self, interface: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(locks.entry(interface.to_string()).or_default())
    }

    /// Acquire the lock for `interface`. In [`LockMode::Reject`] a held lock
    /// fails immediately; in [`LockMode::Wait`] the caller waits up to `wait`.
    pub async fn acquire(
        &self,
        interface: &str,
        mode: LockMode,
        wait: Duration,
    ) -> Result<InterfaceGuard, LockContention> {
        let slot = self.slot(interface);
        let contention = || LockContention {
            interface: interface.to_string(),
        };

        let guard = match mode {
            LockMode::Reject => slot.try_lock_owned().map_err(|_| contention())?,
            LockMode::Wait => match slot.clone().try_lock_owned() {
                Ok(guard) => guard,
                Err(_) => {
                    tracing::info!(interface, wait_secs = wait.as_secs(), "waiting for interface lock");
                    tokio::time::timeout(wait, slot.lock_owned())
                        .await
                        .map_err(|_| contention())?
                }
            },
        };

        tracing::debug!(interface, "interface lock acquired");
        Ok(InterfaceGuard {
            interface: interface.to_string(),
            _guard: guard,
        })
    }
}
