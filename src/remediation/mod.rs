//! Fix actions: the registry, planning, sequential execution, the band
//! comparator and the per-interface execution lock.

pub mod actions;
pub mod band;
pub mod executor;
pub mod lock;
pub mod planner;
pub mod registry;

pub use actions::{
    ActionCommand, ActionErrorKind, ActionId, BandComparison, FixAction, FixAttemptResult,
};
pub use band::{BandComparator, BandOutcome};
pub use executor::{
    EventReceiver, EventSender, ExecutionSummary, Executor, RemediationEvent, event_channel,
};
pub use lock::{InterfaceGuard, InterfaceLocks, LockContention};
pub use planner::Planner;
pub use registry::ActionRegistry;
