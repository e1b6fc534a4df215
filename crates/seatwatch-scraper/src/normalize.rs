//! Conversion from storefront products to [`RawVariantObservation`]s.
//!
//! One observation per variant, in feed order. Interpretation of the label
//! and of the availability signals is left to the reconciler.

use seatwatch_core::{FeedConfig, InventoryPolicy, RawVariantObservation};

use crate::types::{StorefrontProduct, StorefrontVariant};

/// Observations extracted from one feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedObservations {
    pub observations: Vec<RawVariantObservation>,
    /// Variants skipped because they carried no label at all.
    pub malformed: usize,
}

/// Flattens every product's variants into observations tagged with the
/// feed's id and tier.
#[must_use]
pub fn observations_from_products(
    feed: &FeedConfig,
    products: Vec<StorefrontProduct>,
) -> FeedObservations {
    let mut out = FeedObservations::default();

    for product in products {
        for variant in product.variants {
            match observe_variant(feed, variant) {
                Some(obs) => out.observations.push(obs),
                None => {
                    tracing::warn!(
                        feed = %feed.source_id(),
                        product_id = ?product.id,
                        "skipping variant with no title or options"
                    );
                    out.malformed += 1;
                }
            }
        }
    }

    out
}

fn observe_variant(feed: &FeedConfig, variant: StorefrontVariant) -> Option<RawVariantObservation> {
    let raw_label = variant.label()?;

    let inventory_policy = variant.inventory_policy.as_deref().and_then(|raw| {
        let parsed = InventoryPolicy::parse(raw);
        if parsed.is_none() {
            tracing::debug!(
                feed = %feed.source_id(),
                policy = raw,
                "ignoring unrecognised inventory_policy"
            );
        }
        parsed
    });

    Some(RawVariantObservation {
        source_id: feed.source_id().to_string(),
        tier: feed.tier,
        external_id: variant.id.map(|id| id.to_string()),
        raw_label,
        reported_available: variant.available,
        inventory_count: variant.inventory_quantity,
        inventory_policy,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
