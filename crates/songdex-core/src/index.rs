use std::cmp::Ordering;

use crate::model::{IndexedSong, SongRecord};

/// The normalized, totally-ordered song catalog.
///
/// Entries are sorted by date descending, then title ascending, then by
/// their position in the raw input. The order is fixed at construction and
/// every query result is a subsequence of it. There is no way to mutate an
/// index once built; a new catalog means a new index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    songs: Vec<IndexedSong>,
}

impl CatalogIndex {
    /// Normalize and sort a raw catalog.
    ///
    /// Total over any input: malformed fields fall back to sentinels and an
    /// empty catalog yields an empty index.
    #[must_use]
    pub fn build(records: &[SongRecord]) -> Self {
        let mut songs: Vec<IndexedSong> = records
            .iter()
            .enumerate()
            .map(|(position, record)| IndexedSong::from_record(record, position))
            .collect();

        // Positions are unique, so the order is total and an unstable sort
        // cannot disturb anything.
        songs.sort_unstable_by(catalog_order);

        log::debug!("Indexed {} songs", songs.len());
        Self { songs }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn songs(&self) -> &[IndexedSong] {
        &self.songs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexedSong> {
        self.songs.iter()
    }
}

impl<'a> IntoIterator for &'a CatalogIndex {
    type Item = &'a IndexedSong;
    type IntoIter = std::slice::Iter<'a, IndexedSong>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Build a [`CatalogIndex`] from raw records.
#[must_use]
pub fn build_index(records: &[SongRecord]) -> CatalogIndex {
    CatalogIndex::build(records)
}

/// Newest date first, then title A-Z, then raw input order.
///
/// Dates compare as plain strings; callers supply a representation such as
/// `yymmdd` whose lexicographic order is chronological.
pub fn catalog_order(a: &IndexedSong, b: &IndexedSong) -> Ordering {
    b.date_string()
        .cmp(a.date_string())
        .then_with(|| a.title_and_artist().cmp(b.title_and_artist()))
        .then_with(|| a.original_position().cmp(&b.original_position()))
}
