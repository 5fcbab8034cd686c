//! Raw records as delivered by sources

use niceplay_client::{BannerRecord, SongRecord};
use niceplay_core::TrackId;
use serde::{Deserialize, Serialize};

/// A track record in the shape its source produced it
///
/// Sources do not normalize; the playback resolver maps each shape onto a
/// `TrackDescriptor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceRecord {
    /// Banner carousel entry (combined "Title - Artist" label)
    Banner(BannerRecord),

    /// Playlist song (chart, recommendation, liked songs, user playlist)
    Song(SongRecord),
}

impl SourceRecord {
    /// Track id of the underlying song
    pub fn track_id(&self) -> &TrackId {
        match self {
            Self::Banner(banner) => &banner.song_id,
            Self::Song(song) => &song.id,
        }
    }
}

impl From<BannerRecord> for SourceRecord {
    fn from(record: BannerRecord) -> Self {
        Self::Banner(record)
    }
}

impl From<SongRecord> for SourceRecord {
    fn from(record: SongRecord) -> Self {
        Self::Song(record)
    }
}
