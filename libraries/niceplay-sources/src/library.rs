//! Loading library playlists into the side-loaded caches

use crate::error::{Result, SourceError};
use crate::playlist_cache::{PlaylistCache, PlaylistInfo};
use niceplay_client::{NicePlayClient, PlaylistResponse, PlaylistSummary};
use niceplay_core::PlaylistId;
use tracing::info;

fn store(
    cache: &PlaylistCache,
    fallback_id: PlaylistId,
    response: PlaylistResponse,
) -> PlaylistInfo {
    let info = PlaylistInfo {
        id: response.playlist_id.unwrap_or(fallback_id),
        name: response.playlist_name.unwrap_or_default(),
        description: response.description,
        track_count: response.songs.len(),
    };
    cache.set_playlist(info.clone(), response.songs);
    info
}

/// Fetch the logged-in user's liked songs into `cache`.
pub async fn load_liked_songs(
    client: &NicePlayClient,
    cache: &PlaylistCache,
) -> Result<PlaylistInfo> {
    let user = client
        .require_user()
        .await
        .map_err(|e| SourceError::from_client("liked_songs", e))?;

    let response = client
        .playlists()
        .get_liked_songs(&user.id)
        .await
        .map_err(|e| SourceError::from_client("liked_songs", e))?;

    // Responses without a playlist id are keyed by the user id
    let info = store(cache, PlaylistId::new(user.id.as_str()), response);
    info!(playlist_id = %info.id, tracks = info.track_count, "Liked songs loaded");
    Ok(info)
}

/// Fetch a playlist the user opened into `cache`, replacing what it held.
///
/// Summary fields from the library listing fill in what the playlist
/// endpoint omits.
pub async fn open_playlist(
    client: &NicePlayClient,
    cache: &PlaylistCache,
    summary: &PlaylistSummary,
) -> Result<PlaylistInfo> {
    let mut response = client
        .playlists()
        .get_playlist(&summary.id)
        .await
        .map_err(|e| SourceError::from_client("current_playlist", e))?;

    response.playlist_id = Some(summary.id.clone());
    if response.playlist_name.is_none() {
        response.playlist_name = Some(summary.name.clone());
    }
    if response.description.is_none() {
        response.description.clone_from(&summary.description);
    }

    let info = store(cache, summary.id.clone(), response);
    info!(playlist_id = %info.id, tracks = info.track_count, "Playlist opened");
    Ok(info)
}
