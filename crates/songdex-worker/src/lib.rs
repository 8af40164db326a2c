//! Background search worker for songdex.
//!
//! Hosts the catalog index inside an isolated tokio task and talks to it
//! over a pair of ordered channels, so the interactive side never blocks
//! on indexing or filtering. Also provides catalog loading, configuration,
//! and logger setup for the binary.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod worker;

pub use catalog::CatalogSource;
pub use config::Config;
pub use error::{CatalogError, CatalogResult, WorkerError, WorkerResult};
pub use protocol::{Request, Response};
pub use worker::{spawn, ResponseStream, SearchWorker, WorkerState};
