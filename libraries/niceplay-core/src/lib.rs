//! NicePlay Core
//!
//! Platform-agnostic domain types shared by every NicePlay crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Identifiers**: `TrackId`, `PlaylistId`, `UserId` (string newtypes that
//!   also accept numeric ids from the backend)
//! - **Domain Types**: `TrackDescriptor`, `PlaybackContext`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use niceplay_core::{PlaybackContext, PlaylistId, TrackDescriptor};
//!
//! let context: PlaybackContext = "rank".parse().unwrap();
//! assert_eq!(context, PlaybackContext::Chart);
//!
//! let liked = PlaybackContext::LikedSongs(PlaylistId::new("7"));
//! assert_eq!(liked.to_string(), "liked:7");
//!
//! let track = TrackDescriptor::new("42", "Song", "Artist")
//!     .with_audio_url("https://cdn.example.com/42.mp3");
//! assert!(track.audio_url.is_some());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod format;
pub mod types;

pub use error::{CoreError, Result};
pub use format::format_duration;
pub use types::{PlaybackContext, PlaylistId, TrackDescriptor, TrackId, UserId};
