//! NicePlay Backend Client
//!
//! HTTP client library for the NicePlay music backend.
//!
//! # Features
//!
//! - **Authentication**: Login with identifier/password (session cookie)
//! - **Home collections**: Banner songs, chart and recommendation playlists
//! - **Library**: Liked songs and the user's own playlists
//!
//! # Example
//!
//! ```ignore
//! use niceplay_client::{ApiConfig, NicePlayClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NicePlayClient::new(ApiConfig::new("http://localhost:8080"))?;
//!
//!     let user = client.login("alice@example.com", "secret").await?;
//!     println!("Logged in as {}", user.username);
//!
//!     let chart = client.playlists().get_playlist(&"2".into()).await?;
//!     println!("Chart has {} songs", chart.songs.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
mod playlists;
mod types;

// Re-export main types
pub use client::NicePlayClient;
pub use error::{ClientError, Result};
pub use types::{
    ApiConfig, BannerRecord, LoginResponse, PlaylistResponse, PlaylistSummary, SongRecord,
    UserInfo, UserPlaylistsResponse,
};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
pub use playlists::PlaylistClient;
