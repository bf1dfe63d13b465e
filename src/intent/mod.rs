//! Query classification into an action tier plus issue tags.

pub mod classifier;
pub mod rules;

pub use classifier::{Classification, classify, normalize};
pub use rules::{IntentRule, RULES};

use serde::{Deserialize, Serialize};

/// What the caller wants done with the query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    /// Report the current state; never changes anything.
    StatusQuery,
    /// Advise, backed by retrieved knowledge; never changes anything.
    Suggestion,
    /// Diagnose and attempt automatic repair.
    Fix,
}

/// A classified symptom category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueTag {
    ConnectionUnstable,
    HighLatency,
    WeakSignal,
    DnsFailure,
    /// Something is wrong but the query does not say what.
    Unknown,
}
