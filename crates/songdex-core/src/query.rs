//! Substring filtering over a [`CatalogIndex`].

use crate::index::CatalogIndex;
use crate::model::IndexedSong;

/// Trim surrounding whitespace and lowercase a raw query.
#[must_use]
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Iterate the entries matching `term`, in index order.
///
/// An empty (or whitespace-only) term matches everything.
pub fn matching<'a>(
    index: &'a CatalogIndex,
    term: &str,
) -> impl Iterator<Item = &'a IndexedSong> + 'a {
    let needle = normalize_term(term);
    index
        .iter()
        .filter(move |song| needle.is_empty() || song.matches(&needle))
}

/// Return the entries whose search key contains `term`, in index order.
///
/// Matching is a case-insensitive contiguous substring test on the title
/// and artist. No cap is applied: the length of the result is the true
/// match count.
#[must_use]
pub fn query(index: &CatalogIndex, term: &str) -> Vec<IndexedSong> {
    matching(index, term).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;
    use crate::model::SongRecord;

    fn sample_index() -> CatalogIndex {
        build_index(&[
            SongRecord::new()
                .with_title_and_artist("Zebra Song")
                .with_date_string("240101")
                .with_song_code("A1"),
            SongRecord::new()
                .with_title_and_artist("Apple Song")
                .with_date_string("240101")
                .with_song_code("A2"),
            SongRecord::new()
                .with_title_and_artist("Mango Song")
                .with_date_string("240102")
                .with_song_code("A3"),
            SongRecord::new()
                .with_title_and_artist("ABCDE - The Alphabets")
                .with_date_string("190707")
                .with_song_code("B1"),
        ])
    }

    fn titles(songs: &[IndexedSong]) -> Vec<&str> {
        songs.iter().map(IndexedSong::title_and_artist).collect()
    }

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  ZeB \t"), "zeb");
        assert_eq!(normalize_term("   "), "");
        assert_eq!(normalize_term(""), "");
    }

    #[test]
    fn test_empty_query_is_identity() {
        let index = sample_index();
        assert_eq!(query(&index, ""), index.songs());
        assert_eq!(query(&index, "   "), index.songs());
    }

    #[test]
    fn test_query_preserves_index_order() {
        let index = sample_index();
        assert_eq!(
            titles(&query(&index, "song")),
            vec!["Mango Song", "Apple Song", "Zebra Song"]
        );
    }

    #[test]
    fn test_query_single_match() {
        let index = sample_index();
        assert_eq!(titles(&query(&index, "zeb")), vec!["Zebra Song"]);
    }

    #[test]
    fn test_query_no_match_is_empty() {
        let index = sample_index();
        assert!(query(&index, "xyz").is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let index = sample_index();
        assert_eq!(query(&index, "ABC"), query(&index, "abc"));
        assert_eq!(titles(&query(&index, "  AbC ")), vec!["ABCDE - The Alphabets"]);
    }

    #[test]
    fn test_query_matches_inside_words() {
        let index = sample_index();
        assert_eq!(titles(&query(&index, "ango")), vec!["Mango Song"]);
        assert_eq!(titles(&query(&index, "e - the")), vec!["ABCDE - The Alphabets"]);
    }

    #[test]
    fn test_query_result_is_subsequence_of_index() {
        let index = sample_index();
        for term in ["", "a", "song", "e", "s", "zz"] {
            let positions: Vec<usize> = query(&index, term)
                .iter()
                .map(|hit| index.iter().position(|song| song == hit).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{term:?}");
        }
    }

    #[test]
    fn test_query_on_empty_index() {
        let index = CatalogIndex::default();
        assert!(query(&index, "").is_empty());
        assert!(query(&index, "anything").is_empty());
    }
}
