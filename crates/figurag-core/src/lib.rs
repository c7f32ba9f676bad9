//! Shared building blocks for the FigureYa retrieval helper.
//!
//! Holds the domain types, the typed error enum, the figment-backed
//! configuration loader, the collaborator traits and the catalog loader.
//! Everything here is synchronous and free of network access.

pub mod catalog;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::{Catalog, CatalogLoad};
pub use error::{Error, Result};
pub use types::{CatalogEntry, DocumentChunk, Intent, QueryResult};
