//! Enrichment lookups.
//!
//! Providers are stateless functions of the track fields. They know nothing
//! about generations; arbitration between overlapping lookups is entirely the
//! [`GenerationDispatcher`](crate::GenerationDispatcher)'s job.

pub mod album;
pub mod artwork;
pub mod claude;
pub mod genius;
pub mod http;
pub mod itunes;
pub mod lyrics;

pub use album::AlbumInfoProvider;
pub use artwork::ArtworkProvider;
pub use claude::ClaudeClient;
pub use genius::GeniusClient;
pub use http::ApiHttp;
pub use itunes::ItunesClient;
pub use lyrics::LyricsAnalysisProvider;

use crate::enrichment::EnrichmentKind;
use crate::track::TrackSnapshot;
use crate::Result;
use async_trait::async_trait;

/// One kind of enrichment lookup.
///
/// `Ok(None)` means the lookup worked but found nothing; both that and `Err`
/// end up as [`EnrichmentState::Unavailable`](crate::EnrichmentState::Unavailable).
#[async_trait(?Send)]
pub trait EnrichmentProvider {
    type Payload: Clone + std::fmt::Debug + 'static;

    fn kind(&self) -> EnrichmentKind;

    /// Look up the payload for `track`.
    ///
    /// Artwork and lyrics read `(title, artist)`; album info reads `(album, artist)`.
    async fn fetch(&self, track: &TrackSnapshot) -> Result<Option<Self::Payload>>;
}
