//! The `run` command: acquire, reconcile and render every product group.
//!
//! Configuration problems (unreadable catalog, invalid patterns, unknown
//! group filter) abort before any request is made. After that, nothing a
//! storefront does can fail the run: each group degrades on its own.

mod output;

use std::path::PathBuf;

use anyhow::Context as _;
use seatwatch_catalog::Reconciler;
use seatwatch_core::{AppConfig, CatalogFile, FeedOutcome, GroupConfig, ProductGroup};
use seatwatch_scraper::{acquire_group, GroupAcquisition, StorefrontClient};

use crate::render::{self, OutputFormat};

pub(crate) use output::write_atomically;

#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub catalog_path: PathBuf,
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub group_filter: Option<String>,
    pub dry_run: bool,
}

/// Executes one full batch pass and writes (or prints) the document.
///
/// # Errors
///
/// Returns an error for configuration failures, for a failure to build the
/// HTTP client, and for a failure to write the output file. Feed failures
/// are logged and absorbed.
pub(crate) async fn run_status(config: &AppConfig, options: &RunOptions) -> anyhow::Result<()> {
    let catalog = seatwatch_core::load_catalog(&options.catalog_path)
        .with_context(|| format!("loading catalog {}", options.catalog_path.display()))?;

    let groups = select_groups(&catalog, options.group_filter.as_deref())?;
    let planned = build_reconcilers(&catalog, &groups)?;

    let client = StorefrontClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build storefront client: {e}"))?;

    tracing::info!(groups = planned.len(), "starting status run");

    let mut results: Vec<ProductGroup> = Vec::with_capacity(planned.len());
    for (idx, (group, reconciler)) in planned.iter().enumerate() {
        if idx > 0 && config.scraper_inter_request_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(
                config.scraper_inter_request_delay_ms,
            ))
            .await;
        }
        let acquisition =
            acquire_group(&client, group, config.scraper_inter_request_delay_ms).await;
        results.push(build_product_group(group, reconciler, acquisition));
    }

    if !results.is_empty() && results.iter().all(|g| !g.has_data()) {
        tracing::warn!(
            groups = results.len(),
            "no group produced any data; every storefront feed failed or was empty"
        );
    }

    let document = render::render(options.format, &results, chrono::Utc::now())?;

    if options.dry_run {
        print!("{document}");
        return Ok(());
    }

    write_atomically(&options.output_path, &document).await?;
    tracing::info!(
        path = %options.output_path.display(),
        bytes = document.len(),
        "status document written"
    );
    Ok(())
}

/// Groups to process, in catalog order. A filter must name an existing slug.
pub(crate) fn select_groups<'c>(
    catalog: &'c CatalogFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<&'c GroupConfig>> {
    let Some(slug) = filter else {
        return Ok(catalog.groups.iter().collect());
    };

    let selected: Vec<&GroupConfig> = catalog.groups.iter().filter(|g| g.slug() == slug).collect();
    if selected.is_empty() {
        let known: Vec<String> = catalog.groups.iter().map(GroupConfig::slug).collect();
        anyhow::bail!(
            "group '{slug}' not found in catalog (known: {})",
            known.join(", ")
        );
    }
    Ok(selected)
}

/// Builds every group's reconciler before any network traffic, so a bad
/// pattern fails the run at startup.
pub(crate) fn build_reconcilers<'c>(
    catalog: &CatalogFile,
    groups: &[&'c GroupConfig],
) -> anyhow::Result<Vec<(&'c GroupConfig, Reconciler)>> {
    groups
        .iter()
        .map(|group| {
            Reconciler::new(&catalog.settings, group)
                .map(|reconciler| (*group, reconciler))
                .with_context(|| format!("building matcher for group '{}'", group.name))
        })
        .collect()
}

/// Reconciles one group's acquisition into its rendered-ready form.
pub(crate) fn build_product_group(
    group: &GroupConfig,
    reconciler: &Reconciler,
    acquisition: GroupAcquisition,
) -> ProductGroup {
    let any_fetched = acquisition
        .feeds
        .iter()
        .any(|f| matches!(f.outcome, FeedOutcome::Fetched { .. }));

    // Every feed failed: no records at all, so nothing claims "sold out".
    let (records, reconciled_skips) = if any_fetched {
        let reconciliation = reconciler.reconcile(&acquisition.observations);
        (reconciliation.records, reconciliation.skipped)
    } else {
        (Vec::new(), 0)
    };
    let skipped = acquisition.malformed + reconciled_skips;

    let group = ProductGroup {
        name: group.name.clone(),
        slug: group.slug(),
        link: group.link.clone(),
        reference: reconciler
            .reference()
            .iter()
            .map(|v| v.display_name.clone())
            .collect(),
        records,
        feeds: acquisition.feeds,
        skipped_observations: skipped,
    };

    tracing::info!(
        group = %group.slug,
        records = group.records.len(),
        in_stock = group.count_by_status(seatwatch_core::StockStatus::InStock),
        pre_order = group.count_by_status(seatwatch_core::StockStatus::PreOrder),
        out_of_stock = group.count_by_status(seatwatch_core::StockStatus::OutOfStock),
        skipped,
        has_data = group.has_data(),
        "group reconciled"
    );
    group
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
