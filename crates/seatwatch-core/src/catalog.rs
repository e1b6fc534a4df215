use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::variants::FeedTier;
use crate::ConfigError;

/// How observations of the same option are recognised across feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingMode {
    /// Each reference entry is a bucket; an observation lands in the first
    /// bucket whose keywords all occur in its raw label.
    #[default]
    Keywords,
    /// Two cleaned names match when one contains the other.
    Substring,
}

/// What to do when several live observations share one match key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Collapse to one row carrying the best status found.
    #[default]
    BestStatus,
    /// Keep one row per distinct upstream id.
    KeepAll,
}

impl fmt::Display for MatchingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchingMode::Keywords => write!(f, "keywords"),
            MatchingMode::Substring => write!(f, "substring"),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::BestStatus => write!(f, "best_status"),
            DuplicatePolicy::KeepAll => write!(f, "keep_all"),
        }
    }
}

/// Wire format of a feed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFormat {
    /// Shopify AJAX product endpoint, `/products/<handle>.js`.
    Ajax,
    /// Shopify product JSON, `/products/<handle>.json`.
    ProductJson,
    /// Shopify storefront listing, `/products.json`.
    CollectionJson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwatchRule {
    pub keyword: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Defaults to `"<tier>-<index>"` when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub tier: FeedTier,
    pub url: String,
    /// Defaults to `ajax` for live feeds and `product_json` for structural ones.
    #[serde(default)]
    pub format: Option<FeedFormat>,
    /// Product handle to keep when `format` is `collection_json`.
    #[serde(default)]
    pub handle: Option<String>,
}

impl FeedConfig {
    #[must_use]
    pub fn source_id(&self) -> &str {
        self.id.as_deref().unwrap_or("unnamed")
    }

    #[must_use]
    pub fn format(&self) -> FeedFormat {
        self.format.unwrap_or(match self.tier {
            FeedTier::Live => FeedFormat::Ajax,
            FeedTier::Structural => FeedFormat::ProductJson,
        })
    }
}

/// An expected variant, shown even when every feed hides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceVariant {
    pub name: String,
    /// Required keywords for keyword matching (case-insensitive).
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub link: String,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub reference: Vec<ReferenceVariant>,
}

impl GroupConfig {
    /// Generate a URL-safe slug from the group name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Normalizer and reconciler tables shared by every group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub matching: MatchingMode,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    /// Trailing label annotations stripped from display names.
    #[serde(default = "default_status_phrases")]
    pub status_phrases: Vec<String>,
    /// Label phrases that turn an available variant into a pre-order.
    #[serde(default = "default_preorder_phrases")]
    pub preorder_phrases: Vec<String>,
    /// Checked in order; put specific keywords before generic ones.
    #[serde(default = "default_swatches")]
    pub swatches: Vec<SwatchRule>,
    #[serde(default = "default_swatch")]
    pub default_swatch: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            matching: MatchingMode::default(),
            duplicates: DuplicatePolicy::default(),
            status_phrases: default_status_phrases(),
            preorder_phrases: default_preorder_phrases(),
            swatches: default_swatches(),
            default_swatch: default_swatch(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    #[serde(flatten)]
    pub settings: CatalogSettings,
    pub groups: Vec<GroupConfig>,
}

fn default_status_phrases() -> Vec<String> {
    [
        "CURRENTLY IN PRODUCTION",
        "CURRENTLY",
        "IN PRODUCTION",
        "SOLD OUT",
        "OUT OF STOCK",
        "PRE-ORDER",
        "PREORDER",
        "UNAVAILABLE",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_preorder_phrases() -> Vec<String> {
    vec!["PRE-ORDER".to_string(), "PRODUCTION".to_string()]
}

fn default_swatches() -> Vec<SwatchRule> {
    [
        ("Real Leather", "#5C4033"),
        ("Black", "#000"),
        ("Grey", "#666"),
        ("Gray", "#666"),
        ("Brown", "#654321"),
        ("Tan", "#D2B48C"),
    ]
    .into_iter()
    .map(|(keyword, color)| SwatchRule {
        keyword: keyword.to_string(),
        color: color.to_string(),
    })
    .collect()
}

fn default_swatch() -> String {
    "#ccc".to_string()
}

/// Load and validate the catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate catalog YAML already in memory.
///
/// Feed ids left blank are filled in as `"<tier>-<index>"` before validation.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<CatalogFile, ConfigError> {
    let mut catalog: CatalogFile = serde_yaml::from_str(content)?;

    for group in &mut catalog.groups {
        for (idx, feed) in group.feeds.iter_mut().enumerate() {
            if feed.id.as_deref().is_none_or(|id| id.trim().is_empty()) {
                feed.id = Some(format!("{}-{idx}", feed.tier));
            }
        }
    }

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    validate_settings(&catalog.settings)?;

    if catalog.groups.is_empty() {
        return Err(ConfigError::Validation(
            "catalog must define at least one group".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for group in &catalog.groups {
        if group.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "group name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(group.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate group name: '{}'",
                group.name
            )));
        }

        let slug = group.slug();
        if slug.is_empty() || !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate or empty group slug: '{}' (from group '{}')",
                slug, group.name
            )));
        }

        if group.link.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "group '{}' has no link",
                group.name
            )));
        }

        validate_feeds(group)?;
        validate_reference(group, catalog.settings.matching)?;
    }

    Ok(())
}

fn validate_settings(settings: &CatalogSettings) -> Result<(), ConfigError> {
    if settings
        .status_phrases
        .iter()
        .chain(&settings.preorder_phrases)
        .any(|p| p.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "status and pre-order phrases must be non-empty".to_string(),
        ));
    }

    for rule in &settings.swatches {
        if rule.keyword.trim().is_empty() || rule.color.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "swatch rule '{}' needs both a keyword and a color",
                rule.keyword
            )));
        }
    }

    if settings.default_swatch.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_swatch must be non-empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_feeds(group: &GroupConfig) -> Result<(), ConfigError> {
    if group.feeds.is_empty() {
        return Err(ConfigError::Validation(format!(
            "group '{}' has no feeds configured",
            group.name
        )));
    }

    let mut seen_ids = HashSet::new();
    for feed in &group.feeds {
        if feed.url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "group '{}' has a feed with an empty url",
                group.name
            )));
        }
        if !seen_ids.insert(feed.source_id()) {
            return Err(ConfigError::Validation(format!(
                "group '{}' has duplicate feed id '{}'",
                group.name,
                feed.source_id()
            )));
        }
    }

    Ok(())
}

fn validate_reference(group: &GroupConfig, matching: MatchingMode) -> Result<(), ConfigError> {
    for entry in &group.reference {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "group '{}' has a reference variant with an empty name",
                group.name
            )));
        }

        let has_keywords = entry.keywords.iter().any(|k| !k.trim().is_empty());
        if matching == MatchingMode::Keywords && !has_keywords {
            return Err(ConfigError::Validation(format!(
                "group '{}': reference variant '{}' has no keywords but matching is 'keywords'",
                group.name, entry.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
