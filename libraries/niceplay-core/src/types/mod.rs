mod context;
mod ids;
mod track;

pub use context::PlaybackContext;
pub use ids::{PlaylistId, TrackId, UserId};
pub use track::TrackDescriptor;
