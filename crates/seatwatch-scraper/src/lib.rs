//! Feed acquisition from Shopify storefronts.
//!
//! Turns each configured feed into [`seatwatch_core::RawVariantObservation`]s.
//! [`acquire_group`] never fails: an unreachable or unparsable feed is logged
//! and contributes nothing.

pub mod acquire;
pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod types;

pub use acquire::{acquire_group, GroupAcquisition};
pub use client::StorefrontClient;
pub use error::ScraperError;
pub use normalize::{observations_from_products, FeedObservations};
pub use types::{StorefrontProduct, StorefrontVariant};
