//! What a result set looks like on screen: capped rows plus counts.

use songdex_core::IndexedSong;

/// Shown while a non-empty search is in flight.
pub const SEARCHING: &str = "Searching...";

/// Shown while the catalog is being fetched.
pub const LOADING: &str = "Loading songs...";

/// Shown when the search worker cannot be reached.
pub const WORKER_FAILED: &str = "Error initializing search. Please refresh.";

/// Shown when the catalog cannot be fetched.
pub const CATALOG_FAILED: &str = "Failed to load song data.";

/// A result set cut down to the display cap.
///
/// Keeps the true match count so the status line can report both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    term: String,
    rows: Vec<IndexedSong>,
    total_matches: usize,
}

impl ResultsView {
    pub fn new(term: impl Into<String>, mut songs: Vec<IndexedSong>, cap: usize) -> Self {
        let total_matches = songs.len();
        songs.truncate(cap);
        Self {
            term: term.into(),
            rows: songs,
            total_matches,
        }
    }

    /// The raw query this view answers.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn rows(&self) -> &[IndexedSong] {
        &self.rows
    }

    pub fn displayed(&self) -> usize {
        self.rows.len()
    }

    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn is_truncated(&self) -> bool {
        self.total_matches > self.rows.len()
    }

    pub fn status_line(&self) -> String {
        if self.total_matches == 0 {
            String::from("No songs match your search.")
        } else if self.is_truncated() {
            format!(
                "Showing {} of {} matching songs",
                self.displayed(),
                self.total_matches
            )
        } else {
            format!("Showing {} matching songs", self.displayed())
        }
    }
}

pub fn ready_line(total_songs: usize) -> String {
    format!("Ready. {total_songs} songs loaded. Type to search.")
}
