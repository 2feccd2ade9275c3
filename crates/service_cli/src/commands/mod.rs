//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands build their
//! output as a string through `render` and print it from `run`.

pub mod check;
pub mod curve;
pub mod loss;
pub mod range;
pub mod stress;
pub mod waterfall;

use crate::config::OutputFormat;
use crate::Result;
use serde::Serialize;

/// Render rows as a box-drawn table.
pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = |left: &str, mid: &str, right: &str| {
        let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}\n", left, cells.join(mid), right)
    };
    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!(" {:<width$} ", cell, width = w))
            .collect();
        format!("│{}│\n", padded.join("│"))
    };

    let mut out = rule("┌", "┬", "┐");
    out.push_str(&line(headers.to_vec()));
    out.push_str(&rule("├", "┼", "┤"));
    if rows.is_empty() {
        let mut empty = vec![""; headers.len()];
        if let Some(first) = empty.first_mut() {
            *first = "(no data)";
        }
        out.push_str(&line(empty));
    }
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out.push_str(&rule("└", "┴", "┘"));
    out
}

/// Render `value` as pretty JSON.
pub(crate) fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

/// Pick the renderer for `format`.
pub(crate) fn render<T, F>(format: OutputFormat, value: &T, table: F) -> Result<String>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => render_json(value),
        OutputFormat::Table => Ok(table(value)),
    }
}

/// Format a decimal rate as a percentage.
pub(crate) fn pct(rate: f64) -> String {
    format!("{:.4}%", rate * 100.0)
}

/// Format a currency amount.
pub(crate) fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}
