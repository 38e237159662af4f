//! Plain-text table builder for one-shot output.
//!
//! Formats the filtered table as aligned columns for stdout. The job line
//! comes last: identity is only disclosed after the table has been produced.

use crate::model::Job;
use crate::view::{TableView, EMPTY_NOTICE};

const MAX_CELL_WIDTH: usize = 40;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn build_text_summary(view: &TableView, job: Option<&Job>) -> TextSummary {
    let mut lines = Vec::new();

    if view.is_empty() {
        lines.push(EMPTY_NOTICE.to_string());
        return TextSummary { lines };
    }

    let rows = view.all_rows();
    let headers = view.columns();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    for w in widths.iter_mut() {
        *w = (*w).min(MAX_CELL_WIDTH);
    }

    lines.push(format_row(
        &headers.iter().map(String::as_str).collect::<Vec<_>>(),
        &widths,
    ));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        lines.push(format_row(
            &row.iter().map(String::as_str).collect::<Vec<_>>(),
            &widths,
        ));
    }

    lines.push(String::new());
    lines.push(view.info_line());
    if let Some(job) = job {
        lines.push(format!("Job: {}", job.short_id));
    }

    TextSummary { lines }
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{:<w$}", clip(cell, w)))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn clip(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    let mut out: String = cell.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
