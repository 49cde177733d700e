use super::http::{non_empty_str, ApiHttp};
use crate::Result;
use http_client::HttpClient;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ITUNES_BASE_URL: &str = "https://itunes.apple.com";

/// Release year and genre from the iTunes catalog. Empty strings when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumMetadata {
    pub release_year: String,
    pub genre: String,
}

/// iTunes Search API client (no credentials needed).
#[derive(Clone)]
pub struct ItunesClient {
    http: ApiHttp,
    base_url: String,
}

impl ItunesClient {
    pub fn new(client: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self::with_base_url(ApiHttp::new(client, timeout), DEFAULT_ITUNES_BASE_URL.to_string())
    }

    pub fn with_base_url(http: ApiHttp, base_url: String) -> Self {
        Self { http, base_url }
    }

    pub fn http(&self) -> &ApiHttp {
        &self.http
    }

    /// High resolution artwork URL for the best song match.
    pub async fn song_artwork_url(&self, title: &str, artist: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/search?term={}&media=music&entity=song&limit=1",
            self.base_url,
            urlencoding::encode(&format!("{artist} {title}"))
        );
        let json = self.http.get_json(&url, |_| Ok(())).await?;
        Ok(parse_artwork_url(&json))
    }

    /// Look up release year and genre for an album.
    pub async fn album_metadata(&self, artist: &str, album: &str) -> Result<AlbumMetadata> {
        let url = format!(
            "{}/search?term={}&media=music&entity=album&limit=10",
            self.base_url,
            urlencoding::encode(&format!("{artist} {album}"))
        );
        let json = self.http.get_json(&url, |_| Ok(())).await?;
        Ok(parse_album_metadata(&json, artist, album))
    }
}

/// First result's `artworkUrl100`, upgraded to the 600px rendition.
pub fn parse_artwork_url(json: &Value) -> Option<String> {
    non_empty_str(&json["results"][0]["artworkUrl100"])
        .map(|url| url.replace("100x100bb", "600x600bb"))
}

/// Pick the first result whose collection and artist names contain the
/// requested ones (case-insensitive).
pub fn parse_album_metadata(json: &Value, artist: &str, album: &str) -> AlbumMetadata {
    let album_lc = album.to_lowercase();
    let artist_lc = artist.to_lowercase();

    let hit = json["results"].as_array().and_then(|results| {
        results.iter().find(|r| {
            r["collectionName"]
                .as_str()
                .unwrap_or("")
                .to_lowercase()
                .contains(&album_lc)
                && r["artistName"]
                    .as_str()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&artist_lc)
        })
    });

    let Some(hit) = hit else {
        log::debug!("No iTunes album match for '{album}' by '{artist}'");
        return AlbumMetadata::default();
    };

    AlbumMetadata {
        release_year: hit["releaseDate"]
            .as_str()
            .and_then(|date| date.get(..4))
            .unwrap_or("")
            .to_string(),
        genre: hit["primaryGenreName"].as_str().unwrap_or("").to_string(),
    }
}
