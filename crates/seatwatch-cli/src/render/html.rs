use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use seatwatch_core::{ProductGroup, ReconciledRecord, StockStatus};

use super::escape_html;

/// Seconds between automatic page reloads.
const REFRESH_SECS: u32 = 300;

const STYLE: &str = r"
  body { font-family: Helvetica, Arial, sans-serif; margin: 0; padding: 10px; background: #fff; }
  h3 { border-bottom: 2px solid #333; padding-bottom: 10px; margin-top: 0; }
  .date { font-size: 0.8em; color: #666; float: right; font-weight: normal; margin-top: 5px; }
  table { width: 100%; border-collapse: collapse; margin-bottom: 30px; font-size: 14px; }
  .title { background-color: #f4f4f4; padding: 10px; margin: 0; border-left: 5px solid #333; font-weight: bold; font-size: 1.1em; }
  th { text-align: left; padding: 10px; border-bottom: 1px solid #ccc; color: #555; font-size: 0.9em; }
  td { padding: 10px; border-bottom: 1px solid #eee; vertical-align: middle; }
  .box { display: inline-block; width: 12px; height: 12px; border-radius: 2px; margin-right: 8px; border: 1px solid #ccc; vertical-align: middle; }
  a { text-decoration: none; }
  a:hover { text-decoration: underline; }
  .avail { color: #27ae60; font-weight: bold; font-size: 0.9em; text-transform: uppercase; letter-spacing: 0.5px; }
  .pre { color: #e67e22; font-weight: bold; font-size: 0.9em; text-transform: uppercase; letter-spacing: 0.5px; }
  .out-box { position: relative; display: inline-block; color: #666; padding: 0 4px; background: linear-gradient(to top left, transparent 46%, #888 49%, #888 51%, transparent 54%); }
  .out-text { color: #999; font-style: italic; font-size: 0.9em; }
  .note { color: #e67e22; font-size: 0.85em; margin: 6px 0; }
  .no-data { color: #999; font-style: italic; padding: 10px; margin: 0 0 30px 0; }
";

pub(super) fn render_page(groups: &[ProductGroup], generated_at: DateTime<Utc>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<meta http-equiv=\"refresh\" content=\"{REFRESH_SECS}\">");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(
        html,
        "<h3>Seat Availability <span class=\"date\">Updated {}</span></h3>",
        escape_html(&format_timestamp(generated_at))
    );

    for group in groups {
        html.push_str(&render_group(group));
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// `"Mar 04 at 09:15 UTC"`.
pub(super) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%b %d at %H:%M UTC").to_string()
}

/// One group's section: title, optional notes, then the variant table.
///
/// A group with no usable data gets a "No data available" marker instead of
/// a table, so it is never shown as entirely sold out.
pub(super) fn render_group(group: &ProductGroup) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<div class=\"title\" id=\"{}\">{}</div>",
        escape_html(&group.slug),
        escape_html(&group.name)
    );

    if !group.has_data() {
        html.push_str("<p class=\"no-data\">No data available</p>\n");
        return html;
    }

    if !group.live_verified() {
        html.push_str(
            "<p class=\"note\">Availability unverified: the live storefront feed could not be read.</p>\n",
        );
    }

    html.push_str("<table>\n<tr><th>Variant</th><th>Status</th></tr>\n");
    for record in &group.records {
        html.push_str(&render_row(record, &group.link));
    }
    html.push_str("</table>\n");
    html
}

fn render_row(record: &ReconciledRecord, link: &str) -> String {
    let swatch = format!(
        "<span class=\"box\" style=\"background-color: {};\"></span>",
        escape_html(&record.variant.color_hint)
    );
    let name = escape_html(&record.variant.display_name);
    let link = escape_html(link);
    let label = record.status.label();

    let (name_cell, status_cell) = match record.status {
        StockStatus::InStock => (
            format!("{swatch}<a href=\"{link}\" target=\"_blank\">{name}</a>"),
            format!("<a class=\"avail\" href=\"{link}\" target=\"_blank\">{label}</a>"),
        ),
        StockStatus::PreOrder => (
            format!("{swatch}<a href=\"{link}\" target=\"_blank\">{name}</a>"),
            format!("<a class=\"pre\" href=\"{link}\" target=\"_blank\">{label}</a>"),
        ),
        StockStatus::OutOfStock => (
            format!("{swatch}<span class=\"out-box\">{name}</span>"),
            format!("<span class=\"out-text\">{label}</span>"),
        ),
    };

    format!("<tr><td>{name_cell}</td><td>{status_cell}</td></tr>\n")
}
