//! Variant title normalization and catalog reconciliation.
//!
//! Pure, synchronous code: given the observations acquired for one product
//! group, produce one availability verdict per distinct variant. No I/O
//! happens in this crate.

pub mod error;
pub mod reconcile;
pub mod title;

pub use error::CatalogError;
pub use reconcile::{Reconciler, Reconciliation};
pub use title::TitleNormalizer;
