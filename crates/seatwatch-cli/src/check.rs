//! The `check` command: validate the catalog without touching the network.

use std::path::Path;

use anyhow::Context as _;
use seatwatch_core::{CatalogFile, FeedTier};

use crate::run::{build_reconcilers, select_groups};

/// Loads the catalog, compiles every group's matcher and prints a summary.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read, fails validation, or a
/// group's matcher cannot be built.
pub(crate) fn run_check(catalog_path: &Path) -> anyhow::Result<()> {
    let catalog = seatwatch_core::load_catalog(catalog_path)
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
    let groups = select_groups(&catalog, None)?;
    build_reconcilers(&catalog, &groups)?;

    print!("{}", summarize(&catalog));
    tracing::info!(
        path = %catalog_path.display(),
        groups = catalog.groups.len(),
        "catalog is valid"
    );
    Ok(())
}

fn summarize(catalog: &CatalogFile) -> String {
    let settings = &catalog.settings;
    let mut out = format!(
        "catalog OK: {} group(s), matching={}, duplicates={}\n",
        catalog.groups.len(),
        settings.matching,
        settings.duplicates,
    );
    for group in &catalog.groups {
        let live = group.feeds.iter().filter(|f| f.tier == FeedTier::Live).count();
        let structural = group.feeds.len() - live;
        out.push_str(&format!(
            "  {} ({}): {} live feed(s), {} structural feed(s), {} reference variant(s)\n",
            group.name,
            group.slug(),
            live,
            structural,
            group.reference.len(),
        ));
        if live == 0 {
            out.push_str("    warning: no live feed, every variant will show as sold out\n");
        }
    }
    out
}
