use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three independently dispatched lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentKind {
    Artwork,
    AlbumInfo,
    LyricsAnalysis,
}

impl EnrichmentKind {
    pub const ALL: [EnrichmentKind; 3] = [
        EnrichmentKind::Artwork,
        EnrichmentKind::AlbumInfo,
        EnrichmentKind::LyricsAnalysis,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Artwork => "artwork",
            Self::AlbumInfo => "album_info",
            Self::LyricsAnalysis => "lyrics_analysis",
        }
    }
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentState {
    /// Nothing is playing.
    Idle,
    /// A lookup for the current generation is in flight.
    Loading,
    Ready,
    /// The lookup for the current generation failed or found nothing.
    Unavailable,
}

/// What presentation sees for one enrichment kind.
///
/// `payload` is `Some` exactly when `state` is [`EnrichmentState::Ready`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult<P> {
    pub generation: u64,
    pub payload: Option<P>,
    pub state: EnrichmentState,
}

impl<P> EnrichmentResult<P> {
    pub fn idle(generation: u64) -> Self {
        Self::without_payload(generation, EnrichmentState::Idle)
    }

    pub fn loading(generation: u64) -> Self {
        Self::without_payload(generation, EnrichmentState::Loading)
    }

    pub fn unavailable(generation: u64) -> Self {
        Self::without_payload(generation, EnrichmentState::Unavailable)
    }

    pub fn ready(generation: u64, payload: P) -> Self {
        Self {
            generation,
            payload: Some(payload),
            state: EnrichmentState::Ready,
        }
    }

    fn without_payload(generation: u64, state: EnrichmentState) -> Self {
        Self {
            generation,
            payload: None,
            state,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == EnrichmentState::Ready
    }
}

impl<P> Default for EnrichmentResult<P> {
    fn default() -> Self {
        Self::idle(0)
    }
}

/// Cover art for the current track.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Where the image was downloaded from.
    pub url: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Artwork {
    /// Inline `data:` URI suitable for an `<img src>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumInfo {
    /// Four-digit year, empty when unknown.
    pub release_year: String,
    pub genre: String,
    /// A few sentences on the album's context and genesis.
    pub context: String,
    pub notable_fact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsAnalysis {
    pub interpretation: String,
}
