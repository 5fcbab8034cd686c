//! Display formatting helpers

use std::time::Duration;

/// Format a track length as `mm:ss`, zero padded.
///
/// Minutes are not wrapped into hours, so a 61 minute track renders as `61:00`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
