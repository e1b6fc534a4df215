//! Shopify storefront response shapes.
//!
//! Three endpoints are read, all with the same product/variant core:
//!
//! ### `/products/<handle>.js` (AJAX, live tier)
//! Top-level product object. Variants carry `available`, which reflects what
//! the storefront will actually sell. Variants hidden because they are sold
//! out are simply missing. Variant `options` is an array of strings.
//!
//! ### `/products/<handle>.json` (structural tier)
//! `{"product": {...}}`. Lists every variant ever defined, with
//! `inventory_policy` (`"deny"`/`"continue"`), and on some stores
//! `inventory_quantity`. Options are `option1`..`option3`. No trustworthy
//! availability.
//!
//! ### `/products.json` (storefront listing)
//! `{"products": [...]}`, paginated through the `Link` header.
//!
//! Every field except `variants` is optional: these are third-party payloads
//! and a missing field should cost one observation, not the whole feed.

use serde::Deserialize;

/// `GET /products/<handle>.json`.
#[derive(Debug, Deserialize)]
pub struct ProductEnvelope {
    pub product: StorefrontProduct,
}

/// `GET /products.json`.
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<StorefrontProduct>,
}

#[derive(Debug, Deserialize)]
pub struct StorefrontProduct {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub title: Option<String>,

    /// URL slug, e.g. `"vario-f-xxl"`.
    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default)]
    pub variants: Vec<StorefrontVariant>,
}

#[derive(Debug, Deserialize)]
pub struct StorefrontVariant {
    #[serde(default)]
    pub id: Option<i64>,

    /// Combined option label, e.g. `"Black / Real Leather - CURRENTLY IN PRODUCTION"`.
    #[serde(default)]
    pub title: Option<String>,

    /// AJAX-only; `null` for single-variant products.
    #[serde(default)]
    pub public_title: Option<String>,

    /// AJAX-only option values.
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,

    /// Left as `None` when absent; the reconciler decides what absence means.
    #[serde(default)]
    pub available: Option<bool>,

    #[serde(default)]
    pub inventory_quantity: Option<i64>,

    #[serde(default)]
    pub inventory_policy: Option<String>,
}

impl StorefrontVariant {
    /// Best available label: `title`, then `public_title`, then the option
    /// values joined with `" / "`.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let non_blank = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(title) = non_blank(&self.title).or_else(|| non_blank(&self.public_title)) {
            return Some(title);
        }

        let options: Vec<&str> = if self.options.is_empty() {
            [&self.option1, &self.option2, &self.option3]
                .into_iter()
                .filter_map(|o| o.as_deref())
                .collect()
        } else {
            self.options.iter().map(String::as_str).collect()
        };
        let joined = options
            .into_iter()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
            .join(" / ");

        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}
