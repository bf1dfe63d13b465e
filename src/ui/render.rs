use super::style;
use crate::diagnostics::{DiagnosticSnapshot, Reading};
use crate::engine::PlanPreview;
use crate::remediation::BandComparison;
use crate::report::RemediationReport;

fn reading<T>(r: &Reading<T>, show: impl FnOnce(&T) -> String) -> String {
    match r {
        Reading::Measured(v) => style::value(show(v)),
        Reading::Unknown(failure) => style::dim(format!("unknown ({failure})")),
    }
}

fn field(label: &str, text: String) -> String {
    format!("  {} {text}", style::cyan(format!("{label:<12}")))
}

fn snapshot_lines(snapshot: &DiagnosticSnapshot) -> Vec<String> {
    let mut lines = vec![
        format!("  {}", style::header(snapshot.status_line())),
        field("Interface", style::value(&snapshot.interface)),
        field(
            "Link",
            reading(&snapshot.link, |link| {
                if !link.connected {
                    return "not connected".to_string();
                }
                let mut text = link.ssid.clone().unwrap_or_else(|| "(hidden)".into());
                let details: Vec<String> = link
                    .band
                    .map(|b| b.to_string())
                    .into_iter()
                    .chain(link.signal_dbm.map(|dbm| format!("{dbm} dBm")))
                    .collect();
                if !details.is_empty() {
                    text.push_str(&format!(" ({})", details.join(", ")));
                }
                text
            }),
        ),
        field(
            "Latency",
            reading(&snapshot.latency, |l| {
                format!("{:.0}/{:.0}/{:.0} ms (min/avg/max)", l.min_ms, l.avg_ms, l.max_ms)
            }),
        ),
        field("Packet loss", reading(&snapshot.packet_loss_pct, |p| format!("{p:.1}%"))),
        field(
            "DNS",
            reading(&snapshot.dns, |d| match d.avg_ms {
                Some(avg) => format!("{avg:.0}ms avg, {}/{} resolved", d.resolved, d.attempted),
                None => format!("{}/{} resolved", d.resolved, d.attempted),
            }),
        ),
        field(
            "Connections",
            reading(&snapshot.active_connections, |n| format!("{n} established")),
        ),
        field(
            "Gateway",
            reading(&snapshot.routes, |r| {
                r.ipv4_gateway
                    .clone()
                    .or_else(|| r.ipv6_gateway.clone())
                    .unwrap_or_else(|| "none".into())
            }),
        ),
    ];
    if let Some(throughput) = &snapshot.throughput_mbps {
        lines.push(field("Throughput", reading(throughput, |m| format!("{m:.1} Mbit/s"))));
    }
    if let Some(hops) = &snapshot.route_hops {
        lines.push(field("Hops", reading(hops, ToString::to_string)));
    }
    lines.push(field(
        "Quality",
        reading(&snapshot.quality, |q| format!("{:.0} ({})", q.value, q.grade)),
    ));
    lines
}

fn band_line(comparison: &BandComparison) -> String {
    let mbps = |r: &Reading<f64>| match r {
        Reading::Measured(v) => format!("{v:.1} Mbit/s"),
        Reading::Unknown(failure) => format!("unknown ({failure})"),
    };
    let verdict = match (comparison.switched, comparison.final_band) {
        (true, Some(band)) => style::success(format!("switched to {band}")),
        (false, Some(band)) => format!("stayed on {band}"),
        (_, None) => style::failure("final band unknown"),
    };
    format!(
        "  {} {} -> {} {}, {verdict}",
        comparison.original_band,
        mbps(&comparison.original_mbps),
        comparison.alternate_band,
        mbps(&comparison.alternate_mbps),
    )
}

pub fn render_snapshot(snapshot: &DiagnosticSnapshot) -> String {
    let mut lines = vec![format!("◆ {}", style::header("Network status")), String::new()];
    lines.extend(snapshot_lines(snapshot));
    lines.join("\n")
}

pub fn render_plan(preview: &PlanPreview) -> String {
    let mut lines = vec![
        format!("◆ {}", style::header("Remediation plan (dry run)")),
        String::new(),
        field("Intent", style::value(preview.intent)),
        field(
            "Tags",
            if preview.tags.is_empty() {
                style::dim("none")
            } else {
                style::value(
                    preview
                        .tags
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            },
        ),
        field(
            "Rule",
            preview
                .classification
                .rule
                .as_deref()
                .map_or_else(|| style::dim("none"), style::value),
        ),
        String::new(),
    ];
    if preview.actions.is_empty() {
        lines.push(format!("  {}", style::dim("No fix actions would run.")));
    }
    for (i, action) in preview.actions.iter().enumerate() {
        let mut line = format!(
            "  {} {} {}",
            style::accent(format!("{}.", i + 1)),
            action.id,
            style::dim(format!("(rank {})", action.disruption_rank))
        );
        if action.requires_elevated_privilege {
            line.push_str(&format!(" {}", style::yellow("needs root")));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn render_report(report: &RemediationReport) -> String {
    let mut intent = style::value(report.intent);
    if report.intent != report.classification.intent {
        intent.push_str(&style::dim(format!(" (asked: {})", report.classification.intent)));
    }
    if report.classification.ambiguous {
        intent.push_str(&format!(" {}", style::yellow("ambiguous")));
    }

    let mut lines = vec![
        format!(
            "◆ {} {}",
            style::header("netmedic report"),
            style::dim(&report.run_id)
        ),
        String::new(),
        field("Query", format!("\"{}\"", report.query)),
        field("Intent", intent),
        field("Status", style::header(&report.status)),
        field("Outcome", style::value(report.outcome)),
        String::new(),
        style::header("Before"),
    ];
    lines.extend(snapshot_lines(&report.before));

    if !report.plan.is_empty() {
        lines.push(String::new());
        lines.push(style::header("Plan"));
        for (i, id) in report.plan.iter().enumerate() {
            lines.push(format!("  {} {id}", style::accent(format!("{}.", i + 1))));
        }
    }

    let sections = report.sections();
    if !sections.fixed.is_empty() {
        lines.push(String::new());
        lines.push(style::header("Fixed"));
        for entry in &sections.fixed {
            lines.push(format!("  {} {entry}", style::success("✓")));
        }
    }
    if !sections.failed.is_empty() {
        lines.push(String::new());
        lines.push(style::header("Failed"));
        for entry in &sections.failed {
            lines.push(format!("  {} {entry}", style::failure("✗")));
        }
    }
    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push(style::header("Skipped"));
        for id in &report.skipped {
            lines.push(format!("  {} {id}", style::dim("-")));
        }
    }

    let comparisons: Vec<_> = report
        .attempts
        .iter()
        .filter_map(|a| a.band_comparison.as_ref())
        .collect();
    if !comparisons.is_empty() {
        lines.push(String::new());
        lines.push(style::header("Band comparison"));
        lines.extend(comparisons.into_iter().map(band_line));
    }

    if let Some(after) = &report.after {
        lines.push(String::new());
        lines.push(style::header("After"));
        lines.extend(snapshot_lines(after));
    }

    if !sections.recommendation_only.is_empty() {
        lines.push(String::new());
        lines.push(style::header("Recommendations"));
        for advice in &sections.recommendation_only {
            lines.push(format!("  {} {}", style::accent("•"), style::yellow(advice)));
        }
    }

    if let Some(knowledge) = &report.knowledge {
        lines.push(String::new());
        lines.push(style::header("Advice"));
        lines.extend(knowledge.lines().map(|l| format!("  {l}")));
    }

    if !report.warnings.is_empty() {
        lines.push(String::new());
        for warning in &report.warnings {
            lines.push(format!("{} {warning}", style::yellow("!")));
        }
    }

    lines.join("\n")
}
