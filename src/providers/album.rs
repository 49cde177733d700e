use super::claude::{reply_field, ClaudeClient};
use super::genius::GeniusClient;
use super::itunes::{AlbumMetadata, ItunesClient};
use super::EnrichmentProvider;
use crate::enrichment::{AlbumInfo, EnrichmentKind};
use crate::track::TrackSnapshot;
use crate::{LinerNotesError, Result};
use async_trait::async_trait;

pub const DEFAULT_ALBUM_MAX_TOKENS: u32 = 400;

/// Album context: iTunes metadata and the Genius description, summarised by Claude.
///
/// Keyed on `(album, artist)`. The metadata and description lookups are best
/// effort; only the model call decides between a payload and a failure.
pub struct AlbumInfoProvider {
    itunes: ItunesClient,
    genius: Option<GeniusClient>,
    claude: Option<ClaudeClient>,
    language: String,
    max_tokens: u32,
}

impl AlbumInfoProvider {
    pub fn new(
        itunes: ItunesClient,
        genius: Option<GeniusClient>,
        claude: Option<ClaudeClient>,
        language: String,
    ) -> Self {
        Self {
            itunes,
            genius,
            claude,
            language,
            max_tokens: DEFAULT_ALBUM_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait(?Send)]
impl EnrichmentProvider for AlbumInfoProvider {
    type Payload = AlbumInfo;

    fn kind(&self) -> EnrichmentKind {
        EnrichmentKind::AlbumInfo
    }

    async fn fetch(&self, track: &TrackSnapshot) -> Result<Option<AlbumInfo>> {
        let (Some(genius), Some(claude)) = (&self.genius, &self.claude) else {
            return Err(LinerNotesError::MissingCredentials(
                "album info needs api.genius_token and api.anthropic_key",
            ));
        };

        let artist = track.artist.as_str();
        let album = track.album.as_str();

        let (metadata, description) = futures::join!(
            self.itunes.album_metadata(artist, album),
            genius.album_description(artist, album)
        );
        let metadata = metadata.unwrap_or_else(|e| {
            log::warn!("iTunes album lookup failed for '{album}' by '{artist}': {e}");
            AlbumMetadata::default()
        });
        let description = description.unwrap_or_else(|e| {
            log::warn!("Genius album lookup failed for '{album}' by '{artist}': {e}");
            None
        });

        let prompt = build_album_prompt(
            album,
            artist,
            &metadata,
            description.as_deref(),
            &self.language,
        );
        let reply = claude.complete_json("album", self.max_tokens, &prompt).await?;

        Ok(Some(AlbumInfo {
            release_year: metadata.release_year,
            genre: metadata.genre,
            context: reply_field(&reply, "context"),
            notable_fact: reply_field(&reply, "notable_fact"),
        }))
    }
}

pub fn build_album_prompt(
    album: &str,
    artist: &str,
    metadata: &AlbumMetadata,
    description: Option<&str>,
    language: &str,
) -> String {
    let meta = if metadata.release_year.is_empty() {
        String::new()
    } else {
        format!(
            " (released in {}, genre: {})",
            metadata.release_year, metadata.genre
        )
    };

    let base = match description {
        Some(description) => format!(
            "For the album \"{album}\" by {artist}{meta}, based on this description:\n\
             {description}\nAnswer in {language}."
        ),
        None => format!(
            "Using what you know, for the album \"{album}\" by {artist}{meta}, answer in {language}."
        ),
    };

    format!(
        "{base}\n\nReply ONLY with this valid JSON (no markdown): \
         {{\"context\":\"2-3 sentences on the album's context and genesis\",\
         \"notable_fact\":\"One striking fact or anecdote about this album\"}}"
    )
}
