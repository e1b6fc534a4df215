use chrono::{DateTime, Utc};
use seatwatch_core::ProductGroup;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatusDocument<'a> {
    generated_at: DateTime<Utc>,
    groups: Vec<GroupView<'a>>,
}

#[derive(Debug, Serialize)]
struct GroupView<'a> {
    #[serde(flatten)]
    group: &'a ProductGroup,
    has_data: bool,
    live_verified: bool,
}

pub(super) fn render_document(
    groups: &[ProductGroup],
    generated_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let document = StatusDocument {
        generated_at,
        groups: groups
            .iter()
            .map(|group| GroupView {
                group,
                has_data: group.has_data(),
                live_verified: group.live_verified(),
            })
            .collect(),
    };
    let mut out = serde_json::to_string_pretty(&document)?;
    out.push('\n');
    Ok(out)
}
