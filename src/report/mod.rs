//! The structured answer to one query.

pub mod recommend;

use crate::diagnostics::DiagnosticSnapshot;
use crate::intent::{Classification, Intent, IssueTag};
use crate::remediation::{ActionId, ExecutionSummary, FixAction, FixAttemptResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How far remediation got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunOutcome {
    /// Every planned action ran and the after snapshot was captured.
    Completed,
    /// The overall deadline passed; the report holds what finished in time.
    DeadlineExceeded,
    /// Another run held the interface, so nothing was attempted.
    RemediationInProgress,
    /// The intent did not call for remediation.
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub query: String,
    /// Intent acted on, after any downgrade.
    pub intent: Intent,
    pub classification: Classification,
    /// Tags remediation was planned for; includes observed issues when the
    /// query only said something was wrong.
    pub tags: BTreeSet<IssueTag>,
    pub status: String,
    pub before: DiagnosticSnapshot,
    pub after: Option<DiagnosticSnapshot>,
    pub plan: Vec<ActionId>,
    pub attempts: Vec<FixAttemptResult>,
    /// Planned actions that never started.
    pub skipped: Vec<ActionId>,
    pub recommendations: Vec<String>,
    pub knowledge: Option<String>,
    pub outcome: RunOutcome,
    pub warnings: Vec<String>,
}

/// The report split into what was fixed, what failed and what only got
/// advice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSections {
    pub fixed: Vec<String>,
    pub failed: Vec<String>,
    pub recommendation_only: Vec<String>,
}

impl RemediationReport {
    pub fn fixed(&self) -> impl Iterator<Item = &FixAttemptResult> {
        self.attempts.iter().filter(|a| a.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &FixAttemptResult> {
        self.attempts.iter().filter(|a| !a.success)
    }

    pub fn sections(&self) -> ReportSections {
        ReportSections {
            fixed: self
                .fixed()
                .map(|a| format!("{}: {}", a.action_id, a.message))
                .collect(),
            failed: self
                .failed()
                .map(|a| match a.error {
                    Some(kind) => format!("{} ({kind}): {}", a.action_id, a.message),
                    None => format!("{}: {}", a.action_id, a.message),
                })
                .collect(),
            recommendation_only: self.recommendations.clone(),
        }
    }
}

/// Inputs gathered by the engine for one query.
pub struct Synthesis<'a> {
    pub query: &'a str,
    pub classification: Classification,
    pub intent: Intent,
    pub tags: BTreeSet<IssueTag>,
    pub before: DiagnosticSnapshot,
    pub plan: &'a [FixAction],
    pub execution: ExecutionSummary,
    pub knowledge: Option<String>,
    pub outcome: RunOutcome,
    pub warnings: Vec<String>,
}

/// Tags with no successful attempt by an action that addresses them.
fn unresolved(
    tags: &BTreeSet<IssueTag>,
    plan: &[FixAction],
    attempts: &[FixAttemptResult],
) -> BTreeSet<IssueTag> {
    let resolved: BTreeSet<IssueTag> = attempts
        .iter()
        .filter(|a| a.success)
        .filter_map(|a| plan.iter().find(|p| p.id == a.action_id))
        .flat_map(|p| p.addresses.iter().copied())
        .collect();
    tags.difference(&resolved).copied().collect()
}

pub fn synthesize(input: Synthesis<'_>) -> RemediationReport {
    let Synthesis {
        query,
        classification,
        intent,
        tags,
        before,
        plan,
        execution,
        knowledge,
        outcome,
        warnings,
    } = input;

    let recommendations = match intent {
        Intent::StatusQuery => recommend::routine(&before),
        Intent::Suggestion | Intent::Fix => {
            recommend::recommendations_for(&unresolved(&tags, plan, &execution.attempts))
        }
    };

    RemediationReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        generated_at: Utc::now(),
        query: query.to_string(),
        intent,
        classification,
        tags,
        status: before.status_line(),
        before,
        after: execution.after,
        plan: plan.iter().map(|a| a.id).collect(),
        attempts: execution.attempts,
        skipped: execution.skipped,
        recommendations,
        knowledge: knowledge.filter(|k| !k.trim().is_empty()),
        outcome,
        warnings,
    }
}
