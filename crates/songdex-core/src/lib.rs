//! Core catalog model for songdex.
//!
//! This crate defines the raw song records as they arrive from a catalog
//! source, the normalized [`IndexedSong`] entries derived from them, the
//! immutable [`CatalogIndex`] with its deterministic ordering, and the
//! substring query engine that filters it.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod index;
pub mod model;
pub mod query;

pub use error::{Error, Result};
pub use index::{build_index, CatalogIndex};
pub use model::{IndexedSong, SongRecord, NOT_AVAILABLE, UNKNOWN_TITLE};
pub use query::{normalize_term, query};
