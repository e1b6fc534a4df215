//! Merges every feed's observations for one product group into one row per
//! variant, each with a final [`StockStatus`].
//!
//! The live feed is the only source whose availability flag is trusted, but it
//! drops sold-out variants entirely. The structural feed and the reference
//! list enumerate everything, without a usable availability signal. So:
//!
//! - a variant listed by a live feed takes that feed's verdict, refined into
//!   [`StockStatus::PreOrder`] by label phrases or a "sell past zero" policy;
//! - a variant missing from every live feed is [`StockStatus::OutOfStock`].
//!
//! Observations attach to an existing row by shared upstream id first, then
//! by match key (first match wins). Rows come out in reference order, then
//! in order of first appearance.

use seatwatch_core::{
    CanonicalVariant, CatalogSettings, DuplicatePolicy, FeedTier, GroupConfig, InventoryPolicy,
    RawVariantObservation, ReconciledRecord, SourceOfTruth, StockStatus,
};

use crate::error::CatalogError;
use crate::title::TitleNormalizer;

/// Output of [`Reconciler::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: Vec<ReconciledRecord>,
    /// Observations dropped because their label cleaned to nothing.
    pub skipped: usize,
}

/// Reconciliation rules for one product group.
#[derive(Debug, Clone)]
pub struct Reconciler {
    normalizer: TitleNormalizer,
    reference: Vec<CanonicalVariant>,
    /// Upper-cased.
    preorder_phrases: Vec<String>,
    duplicates: DuplicatePolicy,
}

struct Sighting<'o> {
    obs: &'o RawVariantObservation,
    display_name: String,
}

struct Candidate<'o> {
    variant: CanonicalVariant,
    live: Vec<Sighting<'o>>,
    structural: Vec<Sighting<'o>>,
}

impl<'o> Candidate<'o> {
    fn new(variant: CanonicalVariant) -> Self {
        Self {
            variant,
            live: Vec::new(),
            structural: Vec::new(),
        }
    }

    fn sightings(&self) -> impl Iterator<Item = &Sighting<'o>> {
        self.live.iter().chain(&self.structural)
    }

    fn has_external_id(&self, id: &str) -> bool {
        self.sightings()
            .any(|s| s.obs.external_id.as_deref() == Some(id))
    }

    /// A live sighting of a different upstream variant (e.g. another batch).
    fn has_other_live_variant(&self, obs: &RawVariantObservation) -> bool {
        self.live.iter().any(|s| s.obs.external_id != obs.external_id)
    }
}

impl Reconciler {
    /// Builds the reconciler for `group` from the shared catalog tables.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the normalizer patterns cannot be compiled.
    pub fn new(settings: &CatalogSettings, group: &GroupConfig) -> Result<Self, CatalogError> {
        let normalizer = TitleNormalizer::new(settings, &group.reference)?;

        let mut reference: Vec<CanonicalVariant> = Vec::with_capacity(group.reference.len());
        for entry in &group.reference {
            let variant = normalizer.reference_variant(entry);
            if reference.iter().any(|r| r.match_key == variant.match_key) {
                tracing::warn!(
                    group = %group.name,
                    variant = %entry.name,
                    "duplicate reference variant ignored"
                );
                continue;
            }
            reference.push(variant);
        }

        Ok(Self {
            normalizer,
            reference,
            preorder_phrases: settings
                .preorder_phrases
                .iter()
                .map(|p| p.trim().to_uppercase())
                .filter(|p| !p.is_empty())
                .collect(),
            duplicates: settings.duplicates,
        })
    }

    #[must_use]
    pub fn reference(&self) -> &[CanonicalVariant] {
        &self.reference
    }

    /// Reconciles all observations acquired for the group in this run.
    ///
    /// Deterministic: the same observations in the same order always yield
    /// the same records.
    #[must_use]
    pub fn reconcile(&self, observations: &[RawVariantObservation]) -> Reconciliation {
        let mut candidates: Vec<Candidate<'_>> = self
            .reference
            .iter()
            .cloned()
            .map(Candidate::new)
            .collect();
        let mut skipped = 0usize;

        for obs in observations {
            let Some(variant) = self.normalizer.canonicalize(&obs.raw_label) else {
                tracing::warn!(
                    feed = %obs.source_id,
                    external_id = ?obs.external_id,
                    raw_label = %obs.raw_label,
                    "skipping observation with no usable label"
                );
                skipped += 1;
                continue;
            };

            let idx = self.place(&mut candidates, obs, variant.clone());
            let sighting = Sighting {
                obs,
                display_name: variant.display_name,
            };
            match obs.tier {
                FeedTier::Live => candidates[idx].live.push(sighting),
                FeedTier::Structural => candidates[idx].structural.push(sighting),
            }
        }

        let records = candidates.iter().map(|c| self.decide(c)).collect();
        Reconciliation { records, skipped }
    }

    /// Index of the candidate `obs` belongs to, inserting a new one if needed.
    fn place<'o>(
        &self,
        candidates: &mut Vec<Candidate<'o>>,
        obs: &RawVariantObservation,
        variant: CanonicalVariant,
    ) -> usize {
        if let Some(id) = obs.external_id.as_deref() {
            if let Some(idx) = candidates.iter().position(|c| c.has_external_id(id)) {
                return idx;
            }
        }

        let keep_batches_apart =
            self.duplicates == DuplicatePolicy::KeepAll && obs.tier == FeedTier::Live;
        let mut last_same_key = None;

        for (idx, candidate) in candidates.iter().enumerate() {
            if !self
                .normalizer
                .keys_match(&candidate.variant.match_key, &variant.match_key)
            {
                continue;
            }
            if keep_batches_apart && candidate.has_other_live_variant(obs) {
                last_same_key = Some(idx);
                continue;
            }
            return idx;
        }

        let mut fresh = Candidate::new(variant);
        if let Some(prev) = last_same_key {
            // Another batch of an existing variant: keep it next to its sibling.
            fresh.variant.match_key.clone_from(&candidates[prev].variant.match_key);
            candidates.insert(prev + 1, fresh);
            prev + 1
        } else {
            candidates.push(fresh);
            candidates.len() - 1
        }
    }

    fn decide(&self, candidate: &Candidate<'_>) -> ReconciledRecord {
        let (status, source_of_truth, display_name) = match self.best_live(candidate) {
            Some((status, sighting)) => (
                status,
                SourceOfTruth::Feed(sighting.obs.source_id.clone()),
                sighting.display_name.clone(),
            ),
            None => (
                StockStatus::OutOfStock,
                SourceOfTruth::AbsentFromLive,
                candidate.structural.first().map_or_else(
                    || candidate.variant.display_name.clone(),
                    |s| s.display_name.clone(),
                ),
            ),
        };

        let mut external_ids: Vec<String> = Vec::new();
        for id in candidate.sightings().filter_map(|s| s.obs.external_id.as_ref()) {
            if !external_ids.contains(id) {
                external_ids.push(id.clone());
            }
        }

        ReconciledRecord {
            variant: CanonicalVariant {
                color_hint: self.normalizer.color_hint(&display_name),
                display_name,
                match_key: candidate.variant.match_key.clone(),
            },
            status,
            source_of_truth,
            external_ids,
        }
    }

    /// Best status among the live sightings; ties keep the earliest.
    fn best_live<'c>(
        &self,
        candidate: &'c Candidate<'_>,
    ) -> Option<(StockStatus, &'c Sighting<'c>)> {
        let mut best: Option<(StockStatus, &Sighting<'_>)> = None;
        for sighting in &candidate.live {
            let status = self.live_status(sighting.obs, candidate);
            if best.is_none_or(|(current, _)| status.rank() > current.rank()) {
                best = Some((status, sighting));
            }
        }
        best
    }

    fn live_status(&self, obs: &RawVariantObservation, candidate: &Candidate<'_>) -> StockStatus {
        let inventory = inventory_of(obs).or_else(|| structural_inventory(obs, candidate));

        let derived = inventory
            .is_some_and(|(policy, count)| count > 0 || policy == InventoryPolicy::Continue);
        let available = obs.reported_available.unwrap_or(derived);

        if !available {
            return StockStatus::OutOfStock;
        }

        let label = obs.raw_label.to_uppercase();
        if self
            .preorder_phrases
            .iter()
            .any(|phrase| label.contains(phrase.as_str()))
        {
            return StockStatus::PreOrder;
        }

        if inventory.is_some_and(|(policy, count)| policy == InventoryPolicy::Continue && count <= 0)
        {
            return StockStatus::PreOrder;
        }

        StockStatus::InStock
    }
}

fn inventory_of(obs: &RawVariantObservation) -> Option<(InventoryPolicy, i64)> {
    Some((obs.inventory_policy?, obs.inventory_count?))
}

/// Inventory from the structural feed: the same upstream variant if listed,
/// otherwise the first structural sighting of the candidate that has both
/// fields.
fn structural_inventory(
    obs: &RawVariantObservation,
    candidate: &Candidate<'_>,
) -> Option<(InventoryPolicy, i64)> {
    let same_id = obs.external_id.as_deref().and_then(|id| {
        candidate
            .structural
            .iter()
            .filter(|s| s.obs.external_id.as_deref() == Some(id))
            .find_map(|s| inventory_of(s.obs))
    });
    same_id.or_else(|| candidate.structural.iter().find_map(|s| inventory_of(s.obs)))
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
