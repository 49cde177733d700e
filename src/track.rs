use serde::{Deserialize, Serialize};
use std::fmt;

/// Field separator used by the track source commands.
pub const FIELD_DELIMITER: &str = "|||";

/// What the media player reported on one poll.
///
/// A fresh snapshot is produced on every poll and never mutated afterwards.
/// "Nothing playing" is represented as `Option::<TrackSnapshot>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub is_playing: bool,
}

impl TrackSnapshot {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        is_playing: bool,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            is_playing,
        }
    }

    /// The `(title, artist)` key enrichment is dispatched on.
    pub fn identity(&self) -> TrackIdentity {
        TrackIdentity {
            title: self.title.clone(),
            artist: self.artist.clone(),
        }
    }

    /// Label for the playback pill.
    pub fn status_label(&self) -> &'static str {
        if self.is_playing {
            "Playing"
        } else {
            "Paused"
        }
    }

    /// Parse one `title|||artist|||album|||status` line.
    ///
    /// Returns `Ok(None)` for empty output or a `stopped` status, which is how
    /// the player commands say nothing is playing.
    pub fn parse_delimited(raw: &str) -> crate::Result<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let parts: Vec<&str> = raw.splitn(4, FIELD_DELIMITER).collect();
        let [title, artist, album, status] = parts.as_slice() else {
            return Err(crate::LinerNotesError::Parse(format!(
                "expected 4 fields separated by '{FIELD_DELIMITER}', got {}: {raw:?}",
                parts.len()
            )));
        };

        let status = status.trim();
        if status.eq_ignore_ascii_case("stopped") {
            return Ok(None);
        }

        Ok(Some(Self::new(
            title.trim(),
            artist.trim(),
            album.trim(),
            status.eq_ignore_ascii_case("playing"),
        )))
    }
}

impl fmt::Display for TrackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Stable key for "what is playing".
///
/// Compared field by field, never as a joined string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackIdentity {
    pub title: String,
    pub artist: String,
}

impl fmt::Display for TrackIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}
