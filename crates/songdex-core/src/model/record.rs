use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A song exactly as it appears in the raw catalog.
///
/// Every field is kept as an untyped JSON value: catalogs in the wild carry
/// missing keys, `null`s, and numbers where strings are expected, and none
/// of that may fail a load. Normalization happens later, in
/// [`IndexedSong::from_record`](crate::IndexedSong::from_record).
///
/// Deserialization accepts any JSON value. Anything that is not an object
/// becomes a record with every field absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct SongRecord {
    #[serde(rename = "TitleAndArtist", skip_serializing_if = "Option::is_none")]
    pub title_and_artist: Option<Value>,

    #[serde(rename = "SongCode", skip_serializing_if = "Option::is_none")]
    pub song_code: Option<Value>,

    #[serde(rename = "DateString", skip_serializing_if = "Option::is_none")]
    pub date_string: Option<Value>,
}

impl SongRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title_and_artist(mut self, value: impl Into<Value>) -> Self {
        self.title_and_artist = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_song_code(mut self, value: impl Into<Value>) -> Self {
        self.song_code = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_date_string(mut self, value: impl Into<Value>) -> Self {
        self.date_string = Some(value.into());
        self
    }

    /// Parse a catalog document: a JSON array of record-shaped values.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or the top-level value is
    /// not an array. Individual malformed elements never fail the parse.
    pub fn parse_catalog(json: &str) -> Result<Vec<Self>> {
        match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => Ok(items.into_iter().map(Self::from).collect()),
            other => Err(Error::InvalidCatalog(format!(
                "expected a JSON array of songs, found {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<Value> for SongRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from(map),
            _ => Self::default(),
        }
    }
}

impl From<Map<String, Value>> for SongRecord {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            title_and_artist: map.remove("TitleAndArtist"),
            song_code: map.remove("SongCode"),
            date_string: map.remove("DateString"),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
