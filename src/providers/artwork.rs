use super::itunes::ItunesClient;
use super::EnrichmentProvider;
use crate::enrichment::{Artwork, EnrichmentKind};
use crate::track::TrackSnapshot;
use crate::Result;
use async_trait::async_trait;

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Cover art from the iTunes catalog, keyed on `(title, artist)`.
pub struct ArtworkProvider {
    itunes: ItunesClient,
}

impl ArtworkProvider {
    pub fn new(itunes: ItunesClient) -> Self {
        Self { itunes }
    }
}

#[async_trait(?Send)]
impl EnrichmentProvider for ArtworkProvider {
    type Payload = Artwork;

    fn kind(&self) -> EnrichmentKind {
        EnrichmentKind::Artwork
    }

    async fn fetch(&self, track: &TrackSnapshot) -> Result<Option<Artwork>> {
        let Some(url) = self
            .itunes
            .song_artwork_url(&track.title, &track.artist)
            .await?
        else {
            log::info!("No artwork found for {track}");
            return Ok(None);
        };

        let (bytes, content_type) = self.itunes.http().get_bytes(&url).await?;
        if bytes.is_empty() {
            log::info!("Artwork at {url} was empty");
            return Ok(None);
        }

        Ok(Some(Artwork {
            url,
            content_type: content_type
                .filter(|ct| ct.starts_with("image/"))
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            bytes,
        }))
    }
}
