//! Terminal rendering of snapshots, plans and reports.

pub mod render;
pub mod style;

pub use render::{render_plan, render_report, render_snapshot};
