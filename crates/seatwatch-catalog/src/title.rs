//! Variant label cleanup and match-key derivation.
//!
//! Storefront labels arrive as e.g. `"Black / Real Leather - CURRENTLY IN PRODUCTION"`.
//! [`TitleNormalizer::clean_title`] reduces that to `"Real Leather"`:
//!
//! 1. trim, then keep the last `" / "` segment (the selected option), unless
//!    it is blank;
//! 2. cut a trailing `- <status phrase>` annotation, case-insensitively;
//! 3. trim.
//!
//! The match key is either the cleaned name (substring matching) or the name
//! of the first keyword bucket fully satisfied by the raw label (keyword
//! matching).

use regex::Regex;
use seatwatch_core::{CanonicalVariant, CatalogSettings, MatchingMode, ReferenceVariant};

use crate::error::CatalogError;

const OPTION_SEPARATOR: &str = " / ";

/// A named canonical variant recognised by keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeywordBucket {
    name: String,
    /// Lower-cased; every one must occur in the raw label.
    keywords: Vec<String>,
}

impl KeywordBucket {
    fn is_satisfied_by(&self, lower_label: &str) -> bool {
        !self.keywords.is_empty() && self.keywords.iter().all(|k| lower_label.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MatchPolicy {
    Substring,
    /// Buckets in priority order.
    Keywords(Vec<KeywordBucket>),
}

#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    status_suffix: Option<Regex>,
    policy: MatchPolicy,
    /// `(lower-cased keyword, color)` in check order.
    swatches: Vec<(String, String)>,
    default_swatch: String,
}

impl TitleNormalizer {
    /// Builds a normalizer from the catalog tables and one group's reference list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Pattern`] if the status phrases cannot be
    /// compiled into a pattern.
    pub fn new(
        settings: &CatalogSettings,
        reference: &[ReferenceVariant],
    ) -> Result<Self, CatalogError> {
        let status_suffix = status_suffix_pattern(&settings.status_phrases)?;

        let policy = match settings.matching {
            MatchingMode::Substring => MatchPolicy::Substring,
            MatchingMode::Keywords => MatchPolicy::Keywords(
                reference
                    .iter()
                    .map(|entry| KeywordBucket {
                        name: entry.name.trim().to_string(),
                        keywords: entry
                            .keywords
                            .iter()
                            .map(|k| k.trim().to_lowercase())
                            .filter(|k| !k.is_empty())
                            .collect(),
                    })
                    .collect(),
            ),
        };

        let swatches = settings
            .swatches
            .iter()
            .map(|rule| (rule.keyword.trim().to_lowercase(), rule.color.trim().to_string()))
            .collect();

        Ok(Self {
            status_suffix,
            policy,
            swatches,
            default_swatch: settings.default_swatch.trim().to_string(),
        })
    }

    /// Reduces a raw label to its display name. Idempotent.
    #[must_use]
    pub fn clean_title(&self, raw: &str) -> String {
        let selected = select_last_option(raw.trim());
        self.strip_status_suffix(selected).trim().to_string()
    }

    fn strip_status_suffix<'a>(&self, label: &'a str) -> &'a str {
        let Some(m) = self.status_suffix.as_ref().and_then(|re| re.find(label)) else {
            return label;
        };
        let kept = &label[..m.start()];
        if kept.trim().is_empty() {
            label
        } else {
            kept
        }
    }

    /// Canonical identity for an observed label, or `None` when nothing
    /// usable remains after cleanup.
    #[must_use]
    pub fn canonicalize(&self, raw_label: &str) -> Option<CanonicalVariant> {
        let display_name = self.clean_title(raw_label);
        if display_name.is_empty() {
            return None;
        }

        let match_key = match &self.policy {
            MatchPolicy::Substring => display_name.clone(),
            MatchPolicy::Keywords(buckets) => {
                let lower = raw_label.to_lowercase();
                buckets
                    .iter()
                    .find(|b| b.is_satisfied_by(&lower))
                    .map_or_else(|| display_name.clone(), |b| b.name.clone())
            }
        };

        let color_hint = self.color_hint(&display_name);
        Some(CanonicalVariant {
            display_name,
            match_key,
            color_hint,
        })
    }

    /// Canonical identity for a configured reference entry.
    #[must_use]
    pub fn reference_variant(&self, entry: &ReferenceVariant) -> CanonicalVariant {
        let name = entry.name.trim();
        let display_name = match self.clean_title(name) {
            cleaned if cleaned.is_empty() => name.to_string(),
            cleaned => cleaned,
        };
        let match_key = match &self.policy {
            MatchPolicy::Substring => display_name.clone(),
            MatchPolicy::Keywords(_) => name.to_string(),
        };
        let color_hint = self.color_hint(&display_name);
        CanonicalVariant {
            display_name,
            match_key,
            color_hint,
        }
    }

    /// Whether two match keys denote the same option under this policy.
    #[must_use]
    pub fn keys_match(&self, a: &str, b: &str) -> bool {
        match self.policy {
            MatchPolicy::Keywords(_) => a == b,
            MatchPolicy::Substring => {
                !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
            }
        }
    }

    /// Swatch color of the first configured keyword found in `display_name`.
    #[must_use]
    pub fn color_hint(&self, display_name: &str) -> String {
        let lower = display_name.to_lowercase();
        self.swatches
            .iter()
            .find(|(keyword, _)| !keyword.is_empty() && lower.contains(keyword.as_str()))
            .map_or_else(|| self.default_swatch.clone(), |(_, color)| color.clone())
    }
}

fn select_last_option(raw: &str) -> &str {
    match raw.rsplit_once(OPTION_SEPARATOR) {
        Some((_, last)) if !last.trim().is_empty() => last,
        _ => raw,
    }
}

/// `-`, en dash or em dash, then any configured phrase. Spaces inside a
/// phrase match any run of whitespace.
fn status_suffix_pattern(phrases: &[String]) -> Result<Option<Regex>, CatalogError> {
    let alternatives: Vec<String> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?i)\s*[-\u{{2013}}\u{{2014}}]\s*(?:{})", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|source| CatalogError::Pattern {
            what: "status suffix",
            source,
        })
}

#[cfg(test)]
#[path = "title_test.rs"]
mod tests;
