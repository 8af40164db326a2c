use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::SongRecord;

/// Substituted for a missing or falsy `TitleAndArtist`.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Substituted for a missing or falsy `SongCode` or `DateString`.
pub const NOT_AVAILABLE: &str = "N/A";

/// A normalized catalog entry.
///
/// Built once from a [`SongRecord`] and never modified afterwards. The
/// lowercase search key is derived from the display title at construction
/// time so queries never case-fold the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedSong {
    title_and_artist: String,
    search_key: String,
    song_code: String,
    date_string: String,
    original_position: usize,
}

impl IndexedSong {
    /// Normalize a raw record found at `position` in the source catalog.
    #[must_use]
    pub fn from_record(record: &SongRecord, position: usize) -> Self {
        let title_and_artist = coerce(record.title_and_artist.as_ref(), UNKNOWN_TITLE);
        let search_key = title_and_artist.to_lowercase();
        Self {
            title_and_artist,
            search_key,
            song_code: coerce(record.song_code.as_ref(), NOT_AVAILABLE),
            date_string: coerce(record.date_string.as_ref(), NOT_AVAILABLE),
            original_position: position,
        }
    }

    pub fn title_and_artist(&self) -> &str {
        &self.title_and_artist
    }

    /// Lowercase form of [`title_and_artist`](Self::title_and_artist).
    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    pub fn song_code(&self) -> &str {
        &self.song_code
    }

    pub fn date_string(&self) -> &str {
        &self.date_string
    }

    /// Zero-based position of the source record in the raw catalog.
    pub fn original_position(&self) -> usize {
        self.original_position
    }

    /// Whether the entry carries a real song code rather than the sentinel.
    pub fn has_song_code(&self) -> bool {
        self.song_code != NOT_AVAILABLE
    }

    /// Whether the search key contains an already-normalized needle.
    pub fn matches(&self, needle: &str) -> bool {
        self.search_key.contains(needle)
    }
}

/// Turn a raw field into its display string.
///
/// Falsy values (absent, `null`, `false`, `0`, `""`) yield the sentinel.
/// Other scalars use their natural text form, with whole-valued floats
/// written without a fraction (`1.0` becomes `"1"`). Arrays and objects
/// fall back to compact JSON.
fn coerce(value: Option<&Value>, sentinel: &str) -> String {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => sentinel.to_string(),
        Some(Value::String(s)) if s.is_empty() => sentinel.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if is_zero(n) => sentinel.to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Some(Value::Bool(true)) => String::from("true"),
        Some(other) => other.to_string(),
    }
}

#[allow(clippy::float_cmp)]
fn is_zero(n: &serde_json::Number) -> bool {
    n.as_u64() == Some(0) || n.as_i64() == Some(0) || n.as_f64() == Some(0.0)
}
