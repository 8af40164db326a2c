//! Messages exchanged with the search worker.
//!
//! Both directions are tagged unions discriminated by a `type` field, with
//! camelCase payload keys, so a request or response serializes to the same
//! JSON shape a browser worker would post.

use serde::{Deserialize, Serialize};
use songdex_core::{IndexedSong, SongRecord};

/// A message sent to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    /// Replace the index with one built from this raw catalog.
    Load { songs: Vec<SongRecord> },

    /// Filter the current index by a raw query string.
    Filter { term: String },
}

/// A message sent back by the worker, one per request, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    /// Answers [`Request::Load`] once the index is built.
    Loaded { total_songs: usize },

    /// Answers [`Request::Filter`] with every match, in index order.
    Results { songs: Vec<IndexedSong> },
}

impl Request {
    pub fn filter(term: impl Into<String>) -> Self {
        Self::Filter { term: term.into() }
    }

    /// Short label for log lines; never includes the catalog itself.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Filter { .. } => "filter",
        }
    }
}
