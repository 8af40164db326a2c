pub mod record;
pub mod song;

pub use record::SongRecord;
pub use song::{IndexedSong, NOT_AVAILABLE, UNKNOWN_TITLE};
