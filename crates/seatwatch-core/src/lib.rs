//! Shared data model and configuration for seatwatch.
//!
//! The catalog file (product groups, feeds, reference variants, keyword and
//! swatch tables) and the environment-driven [`AppConfig`] are loaded here so
//! that every other crate receives plain, validated values.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod variants;

use thiserror::Error;

pub use app_config::AppConfig;
pub use catalog::{
    load_catalog, parse_catalog, CatalogFile, CatalogSettings, DuplicatePolicy, FeedConfig,
    FeedFormat, GroupConfig, MatchingMode, ReferenceVariant, SwatchRule,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use variants::{
    CanonicalVariant, FeedOutcome, FeedSummary, FeedTier, InventoryPolicy, ProductGroup,
    RawVariantObservation, ReconciledRecord, SourceOfTruth, StockStatus,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
