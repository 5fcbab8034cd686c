//! NicePlay - Track Sources
//!
//! One cache per playback context, each with an explicit lifecycle:
//! - `CachedSource`: fetch once from the backend, serve from memory afterwards,
//!   de-duplicate concurrent fetches, reset on logout
//! - `PlaylistCache`: side-loaded by library pages (liked songs, the playlist
//!   currently open) and matched by playlist id
//! - `SourceRegistry`: the set of caches one application lifetime owns
//!
//! # Example
//!
//! ```rust,no_run
//! use niceplay_client::{ApiConfig, NicePlayClient};
//! use niceplay_sources::{SourceProvider, SourceRegistry, SourcesConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NicePlayClient::new(ApiConfig::new("http://localhost:8080"))?;
//! let sources = SourceRegistry::from_client(client, &SourcesConfig::default());
//!
//! // First call hits the network, later calls are served from the cache
//! let chart = sources.chart().fetch_if_absent().await?;
//! println!("{} chart entries", chart.len());
//!
//! // On logout every cache forgets its data
//! sources.reset_all();
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
mod fetcher;
mod library;
mod playlist_cache;
mod provider;
mod record;
mod registry;

pub use cache::{CachedSource, LoadState};
pub use error::{Result, SourceError};
pub use fetcher::{BannerFetcher, PlaylistFetcher, RecordFetcher};
pub use library::{load_liked_songs, open_playlist};
pub use playlist_cache::{PlaylistCache, PlaylistInfo};
pub use provider::SourceProvider;
pub use record::SourceRecord;
pub use registry::{SourceRegistry, SourcesConfig};
