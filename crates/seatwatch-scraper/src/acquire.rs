//! Fetches every feed of one product group.
//!
//! Feeds are fetched one after another with a fixed pause in between, so a
//! storefront never sees concurrent requests from one run. A failed feed is
//! logged and recorded in the group's [`FeedSummary`] list; it never aborts
//! the group or the run.

use std::time::Duration;

use seatwatch_core::{FeedOutcome, FeedSummary, GroupConfig, RawVariantObservation};

use crate::client::StorefrontClient;
use crate::normalize::observations_from_products;

/// Everything acquired for one group in this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAcquisition {
    /// All feeds' observations, in feed order then variant order.
    pub observations: Vec<RawVariantObservation>,
    /// One entry per configured feed, in configuration order.
    pub feeds: Vec<FeedSummary>,
    /// Variants dropped before reconciliation for lack of any label.
    pub malformed: usize,
}

/// Fetches and flattens every feed of `group`. Infallible by contract.
pub async fn acquire_group(
    client: &StorefrontClient,
    group: &GroupConfig,
    inter_request_delay_ms: u64,
) -> GroupAcquisition {
    let mut acquisition = GroupAcquisition::default();

    for (idx, feed) in group.feeds.iter().enumerate() {
        if idx > 0 && inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
        }

        let outcome = match client.fetch_feed(feed).await {
            Ok(products) => {
                let extracted = observations_from_products(feed, products);
                tracing::info!(
                    group = %group.name,
                    feed = %feed.source_id(),
                    tier = %feed.tier,
                    observations = extracted.observations.len(),
                    malformed = extracted.malformed,
                    "feed fetched"
                );
                let count = extracted.observations.len();
                acquisition.malformed += extracted.malformed;
                acquisition.observations.extend(extracted.observations);
                FeedOutcome::Fetched {
                    observations: count,
                }
            }
            Err(e) => {
                tracing::warn!(
                    group = %group.name,
                    feed = %feed.source_id(),
                    tier = %feed.tier,
                    url = %feed.url,
                    error = %e,
                    "feed fetch failed; continuing without it"
                );
                FeedOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        acquisition.feeds.push(FeedSummary {
            source_id: feed.source_id().to_string(),
            tier: feed.tier,
            url: feed.url.clone(),
            outcome,
        });
    }

    acquisition
}
