use super::rules::{IntentRule, RULES};
use super::{Intent, IssueTag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of classifying one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub tags: BTreeSet<IssueTag>,
    /// Name of the winning rule; `None` when the default applied.
    pub rule: Option<String>,
    /// More than one rule of the winning tier matched.
    pub ambiguous: bool,
}

impl Classification {
    fn fallback() -> Self {
        Self {
            intent: Intent::StatusQuery,
            tags: BTreeSet::new(),
            rule: None,
            ambiguous: false,
        }
    }
}

/// Lower-case the query, turn every non-alphanumeric character into a
/// space and collapse runs of whitespace.
pub fn normalize(query: &str) -> String {
    let mapped: String = query
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify `query` against the static rule table. First match wins.
pub fn classify(query: &str) -> Classification {
    classify_with(query, RULES)
}

pub(crate) fn classify_with(query: &str, rules: &[IntentRule]) -> Classification {
    let padded = format!(" {} ", normalize(query));

    let Some((index, winner)) = rules.iter().enumerate().find(|(_, r)| r.matches(&padded)) else {
        return Classification::fallback();
    };

    let rivals: Vec<&str> = rules[index + 1..]
        .iter()
        .filter(|r| r.intent == winner.intent && r.matches(&padded))
        .map(|r| r.name)
        .collect();
    let ambiguous = !rivals.is_empty();
    if ambiguous {
        tracing::warn!(
            winner = winner.name,
            rivals = ?rivals,
            "ambiguous classification, using first rule in table order"
        );
    }

    Classification {
        intent: winner.intent,
        tags: winner.tags.iter().copied().collect(),
        rule: Some(winner.name.to_string()),
        ambiguous,
    }
}
