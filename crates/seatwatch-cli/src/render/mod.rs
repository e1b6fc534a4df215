//! Turns reconciled product groups into the output document.
//!
//! Rendering is a pure mapping: it never changes a status, it only decides
//! how each status looks.

mod html;
mod json;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use seatwatch_core::ProductGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Self-refreshing HTML status page
    Html,
    /// Machine-readable JSON document
    Json,
}

/// Renders the whole document for `groups` in `format`.
///
/// # Errors
///
/// Returns an error if the JSON document cannot be serialized.
pub(crate) fn render(
    format: OutputFormat,
    groups: &[ProductGroup],
    generated_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Html => Ok(html::render_page(groups, generated_at)),
        OutputFormat::Json => json::render_document(groups, generated_at),
    }
}

/// Minimal HTML escaping for text and attribute values.
pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
