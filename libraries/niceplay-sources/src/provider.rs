//! Source provider trait

use crate::error::Result;
use crate::record::SourceRecord;
use async_trait::async_trait;
use niceplay_core::PlaylistId;

/// A cache supplying the raw track collection for one playback context
///
/// Implementations are constructed once per application lifetime and shared
/// behind `Arc`.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Return cached records, fetching them first if the cache is empty.
    ///
    /// At most one fetch is in flight per provider; concurrent callers await
    /// the same fetch.
    async fn fetch_if_absent(&self) -> Result<Vec<SourceRecord>>;

    /// Cached records, or an empty list if nothing is loaded
    fn cached(&self) -> Vec<SourceRecord>;

    /// Drop cached data (and forget any in-flight fetch)
    fn reset(&self);

    /// Id of the playlist currently held, for playlist-backed caches
    fn loaded_playlist_id(&self) -> Option<PlaylistId> {
        None
    }
}
