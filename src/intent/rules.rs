use super::{Intent, IssueTag};

/// One row of the classification table. Phrases are written in normalized
/// form (lower case, punctuation replaced by single spaces) and match on
/// whole-word boundaries.
#[derive(Debug)]
pub struct IntentRule {
    pub name: &'static str,
    pub intent: Intent,
    pub tags: &'static [IssueTag],
    pub phrases: &'static [&'static str],
}

/// The classification table, evaluated top to bottom. Fix-tier rows come
/// before Suggestion-tier rows, which come before StatusQuery-tier rows.
pub static RULES: &[IntentRule] = &[
    IntentRule {
        name: "fix_unstable",
        intent: Intent::Fix,
        tags: &[IssueTag::ConnectionUnstable],
        phrases: &[
            "unstable",
            "keeps dropping",
            "keeps disconnecting",
            "disconnecting",
            "intermittent",
            "connection drops",
            "drops out",
        ],
    },
    IntentRule {
        name: "fix_dns",
        intent: Intent::Fix,
        tags: &[IssueTag::DnsFailure],
        phrases: &[
            "dns",
            "can t resolve",
            "cannot resolve",
            "server not found",
            "sites won t load",
            "websites won t load",
        ],
    },
    IntentRule {
        name: "fix_latency",
        intent: Intent::Fix,
        tags: &[IssueTag::HighLatency],
        phrases: &[
            "slow",
            "lag",
            "laggy",
            "lagging",
            "buffering",
            "high ping",
            "high latency",
        ],
    },
    IntentRule {
        name: "fix_signal",
        intent: Intent::Fix,
        tags: &[IssueTag::WeakSignal],
        phrases: &["weak", "poor signal", "low signal", "bad signal", "no bars"],
    },
    IntentRule {
        name: "fix_generic",
        intent: Intent::Fix,
        tags: &[IssueTag::Unknown],
        phrases: &[
            "fix",
            "repair",
            "not working",
            "broken",
            "no internet",
            "troubleshoot",
        ],
    },
    IntentRule {
        name: "suggestion",
        intent: Intent::Suggestion,
        tags: &[],
        phrases: &[
            "how can i",
            "how do i",
            "how to",
            "tips",
            "recommend",
            "should i",
            "advice",
            "improve",
            "why is",
            "best way",
        ],
    },
    IntentRule {
        name: "status",
        intent: Intent::StatusQuery,
        tags: &[],
        phrases: &[
            "status",
            "connected",
            "what is my",
            "ssid",
            "network name",
            "signal strength",
            "how is my",
            "ip address",
            "latency",
            "ping",
        ],
    },
];

impl IntentRule {
    /// `padded` must be a normalized query wrapped in single spaces.
    pub fn matches(&self, padded: &str) -> bool {
        self.phrases
            .iter()
            .any(|phrase| padded.contains(&format!(" {phrase} ")))
    }
}
