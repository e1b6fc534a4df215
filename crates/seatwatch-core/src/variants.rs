//! Variant observations and reconciled availability records.
//!
//! A run starts from [`RawVariantObservation`]s (one per variant per feed) and
//! ends with one [`ProductGroup`] per configured product, each holding its
//! [`ReconciledRecord`]s. Nothing here survives between runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trust tier of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedTier {
    /// Lists only active variants, but its availability flag is authoritative.
    Live,
    /// Lists every defined variant, including hidden ones; availability is
    /// not trustworthy.
    Structural,
}

impl fmt::Display for FeedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedTier::Live => write!(f, "live"),
            FeedTier::Structural => write!(f, "structural"),
        }
    }
}

/// Whether the storefront keeps selling once the stock count reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryPolicy {
    Deny,
    Continue,
}

impl InventoryPolicy {
    /// Parses Shopify's `inventory_policy` string. Unknown values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deny" => Some(Self::Deny),
            "continue" => Some(Self::Continue),
            _ => None,
        }
    }
}

/// One sighting of a variant in one feed.
///
/// Observations are never mutated after acquisition; the reconciler only
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVariantObservation {
    /// Id of the feed that produced this observation.
    pub source_id: String,
    pub tier: FeedTier,
    /// Upstream variant id, unique within a feed.
    pub external_id: Option<String>,
    /// Untouched variant label, e.g. `"Black / Real Leather - CURRENTLY IN PRODUCTION"`.
    pub raw_label: String,
    pub reported_available: Option<bool>,
    pub inventory_count: Option<i64>,
    pub inventory_policy: Option<InventoryPolicy>,
}

/// Feed-independent identity of one product option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalVariant {
    pub display_name: String,
    pub match_key: String,
    /// CSS color used for the swatch box next to the name.
    pub color_hint: String,
}

/// Final availability verdict for a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    InStock,
    PreOrder,
    OutOfStock,
}

impl StockStatus {
    /// Precedence used when collapsing duplicates: higher wins.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            StockStatus::InStock => 2,
            StockStatus::PreOrder => 1,
            StockStatus::OutOfStock => 0,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StockStatus::InStock => "Available",
            StockStatus::PreOrder => "Pre-Order",
            StockStatus::OutOfStock => "Sold Out",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "IN_STOCK"),
            StockStatus::PreOrder => write!(f, "PRE_ORDER"),
            StockStatus::OutOfStock => write!(f, "OUT_OF_STOCK"),
        }
    }
}

/// What decided a record's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "feed", rename_all = "snake_case")]
pub enum SourceOfTruth {
    /// The live feed with this id listed the variant.
    Feed(String),
    /// No live feed listed the variant; treated as hidden because sold out.
    AbsentFromLive,
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    pub variant: CanonicalVariant,
    pub status: StockStatus,
    pub source_of_truth: SourceOfTruth,
    /// Upstream ids of every observation folded into this row.
    pub external_ids: Vec<String>,
}

/// Result of fetching one configured feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FeedOutcome {
    Fetched { observations: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSummary {
    pub source_id: String,
    pub tier: FeedTier,
    pub url: String,
    #[serde(flatten)]
    pub outcome: FeedOutcome,
}

/// A named product and everything computed for it in this run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductGroup {
    pub name: String,
    pub slug: String,
    /// Where the "Available" and "Pre-Order" cells link to.
    pub link: String,
    /// Expected variants from configuration, in display order.
    pub reference: Vec<String>,
    pub records: Vec<ReconciledRecord>,
    pub feeds: Vec<FeedSummary>,
    /// Observations dropped because they had no usable label.
    pub skipped_observations: usize,
}

impl ProductGroup {
    /// `false` when no feed yielded a single usable observation.
    ///
    /// Such a group must be rendered as "no data", not as all sold out.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.feeds.iter().any(|f| {
            matches!(f.outcome, FeedOutcome::Fetched { observations } if observations > 0)
        })
    }

    /// `true` when at least one live-tier feed was fetched successfully.
    #[must_use]
    pub fn live_verified(&self) -> bool {
        self.feeds
            .iter()
            .any(|f| f.tier == FeedTier::Live && matches!(f.outcome, FeedOutcome::Fetched { .. }))
    }

    #[must_use]
    pub fn count_by_status(&self, status: StockStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }
}
