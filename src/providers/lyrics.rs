use super::claude::{reply_field, ClaudeClient};
use super::genius::GeniusClient;
use super::EnrichmentProvider;
use crate::enrichment::{EnrichmentKind, LyricsAnalysis};
use crate::track::TrackSnapshot;
use crate::{LinerNotesError, Result};
use async_trait::async_trait;

pub const DEFAULT_LYRICS_MAX_TOKENS: u32 = 450;

/// Interpretation of the song's lyrics, keyed on `(title, artist)`.
///
/// No Genius hit means nothing to interpret (`Ok(None)`); a hit whose page
/// has no scrapeable lyrics still gets an interpretation from the model's
/// own knowledge.
pub struct LyricsAnalysisProvider {
    genius: Option<GeniusClient>,
    claude: Option<ClaudeClient>,
    language: String,
    max_tokens: u32,
}

impl LyricsAnalysisProvider {
    pub fn new(genius: Option<GeniusClient>, claude: Option<ClaudeClient>, language: String) -> Self {
        Self {
            genius,
            claude,
            language,
            max_tokens: DEFAULT_LYRICS_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait(?Send)]
impl EnrichmentProvider for LyricsAnalysisProvider {
    type Payload = LyricsAnalysis;

    fn kind(&self) -> EnrichmentKind {
        EnrichmentKind::LyricsAnalysis
    }

    async fn fetch(&self, track: &TrackSnapshot) -> Result<Option<LyricsAnalysis>> {
        let (Some(genius), Some(claude)) = (&self.genius, &self.claude) else {
            return Err(LinerNotesError::MissingCredentials(
                "lyrics analysis needs api.genius_token and api.anthropic_key",
            ));
        };

        let Some(song_url) = genius.song_url(&track.title, &track.artist).await? else {
            return Ok(None);
        };

        let lyrics = genius.fetch_lyrics(&song_url).await.unwrap_or_else(|e| {
            log::warn!("Could not scrape lyrics from {song_url}: {e}");
            None
        });

        let prompt = build_lyrics_prompt(&track.title, &track.artist, lyrics.as_deref(), &self.language);
        let reply = claude.complete_json("lyrics", self.max_tokens, &prompt).await?;

        Ok(Some(LyricsAnalysis {
            interpretation: reply_field(&reply, "interpretation"),
        }))
    }
}

pub fn build_lyrics_prompt(title: &str, artist: &str, lyrics: Option<&str>, language: &str) -> String {
    let intro = format!(
        "You are an expert in music and lyric analysis. For the song \"{title}\" by {artist}"
    );

    let body = match lyrics {
        Some(lyrics) => format!(
            "{intro}, here are the lyrics:\n\n{lyrics}\n\n\
             Based on these lyrics, explain in 3-4 sentences in {language}"
        ),
        None => format!("{intro}, explain in 3-4 sentences in {language} (using what you know)"),
    };

    format!(
        "{body}: the main theme, the emotion it carries, and what the artist is trying \
         to express. Be precise and go beyond a simple summary.\n\n\
         Reply ONLY with this JSON (no markdown): {{\"interpretation\": \"...\"}}"
    )
}
