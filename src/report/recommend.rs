use crate::diagnostics::DiagnosticSnapshot;
use crate::intent::IssueTag;
use std::collections::BTreeSet;

/// Fixed advice for an issue the engine could not repair.
pub fn for_tag(tag: IssueTag) -> &'static str {
    match tag {
        IssueTag::ConnectionUnstable => {
            "Connection drops usually mean interference: move the router away from \
             microwaves and cordless phones, and try a different WiFi channel."
        }
        IssueTag::HighLatency => {
            "High latency often comes from a busy network: pause large downloads, \
             restart the router, and prefer the 5GHz band when you are close to it."
        }
        IssueTag::WeakSignal => {
            "The signal is weak: move closer to the router, raise it off the floor, \
             or add a mesh node or WiFi extender."
        }
        IssueTag::DnsFailure => {
            "Name lookups are failing: set an alternative DNS resolver such as \
             8.8.8.8 or 1.1.1.1 on this device or the router."
        }
        IssueTag::Unknown => {
            "If the problem continues, power-cycle the modem and router and check \
             your provider's status page for outages."
        }
    }
}

/// Routine advice for a status answer, driven by what the snapshot shows.
pub fn routine(snapshot: &DiagnosticSnapshot) -> Vec<String> {
    recommendations_for(&snapshot.observed_issues())
}

pub fn recommendations_for(tags: &BTreeSet<IssueTag>) -> Vec<String> {
    tags.iter().map(|tag| for_tag(*tag).to_string()).collect()
}
