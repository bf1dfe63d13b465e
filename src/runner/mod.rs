//! Command execution boundary.
//!
//! Every OS-level network operation the engine performs goes through a
//! [`CommandRunner`]. The system implementation maps a [`NetCommand`] to the
//! host's tools; the fake implementation replays scripted output so the rest
//! of the engine can be tested deterministically.

pub mod fake;
pub(crate) mod platform;
pub mod system;
pub mod traits;
pub mod types;

pub use fake::{FakeCommandRunner, FakeResponse};
pub use system::SystemCommandRunner;
pub use traits::CommandRunner;
pub use types::{Band, CommandError, CommandOutput, NetCommand, ping_deadline_secs};
