// src/render/style.rs

use crossterm::style::Stylize;

use crate::types::{CommandResult, Status};

pub fn icon(status: Status) -> &'static str {
    match status {
        Status::Dirty => "⟳",
        Status::Ok => "✔",
        Status::Bad => "✘",
    }
}

/// `"{name} {icon}: {output}"` without any styling.
pub fn plain_line(result: &CommandResult) -> String {
    format!(
        "{} {}: {}",
        result.name,
        icon(result.status),
        result.output.trim_end()
    )
}

/// Same layout as [`plain_line`], with a status-coloured label.
///
/// Output of a `Dirty` result is stale, so it is dimmed.
pub fn styled_line(result: &CommandResult) -> String {
    let label = format!("{} {}", result.name, icon(result.status));
    let output = result.output.trim_end();

    match result.status {
        Status::Ok => format!("{}: {}", label.green().bold(), output),
        Status::Bad => format!("{}: {}", label.red().bold(), output),
        Status::Dirty => format!("{}: {}", label.white().bold(), output.dim()),
    }
}
