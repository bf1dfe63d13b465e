use console::style;
use std::fmt::Display;

/// Green bold: fixed actions, healthy grades
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// Red bold: failed actions
pub fn failure<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

/// White bold: section headers, titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: unknown readings, secondary text
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: warnings, recommendations
pub fn yellow<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Green: measured values
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold: bullets, plan step numbers
pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}

/// Cyan: field labels
pub fn cyan<D: Display>(text: D) -> String {
    style(text).cyan().to_string()
}
