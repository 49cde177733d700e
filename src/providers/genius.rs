use super::http::{non_empty_str, ApiHttp};
use crate::headers::add_bearer_auth;
use crate::Result;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;

pub const DEFAULT_GENIUS_BASE_URL: &str = "https://api.genius.com";

/// Lyrics sent to the model are capped at this many characters.
pub const MAX_LYRICS_CHARS: usize = 3000;

/// Genius API client: search, album descriptions and lyrics pages.
#[derive(Clone)]
pub struct GeniusClient {
    http: ApiHttp,
    token: String,
    base_url: String,
}

impl GeniusClient {
    pub fn with_base_url(http: ApiHttp, token: String, base_url: String) -> Self {
        Self {
            http,
            token,
            base_url,
        }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        self.http
            .get_json(&url, |request| add_bearer_auth(request, &self.token))
            .await
    }

    async fn search(&self, query: &str) -> Result<Value> {
        self.get(&format!("/search?q={}", urlencoding::encode(query)))
            .await
    }

    /// URL of the song page for the best search hit.
    pub async fn song_url(&self, title: &str, artist: &str) -> Result<Option<String>> {
        let search = self.search(&format!("{artist} {title}")).await?;
        let url = non_empty_str(&first_hit(&search)["url"]).map(str::to_string);
        if url.is_none() {
            log::info!("No Genius hits for '{title}' by '{artist}'");
        }
        Ok(url)
    }

    /// Album description preview, found through search → song → album.
    pub async fn album_description(&self, artist: &str, album: &str) -> Result<Option<String>> {
        let search = self.search(&format!("{artist} {album}")).await?;
        let Some(song_id) = first_hit(&search)["id"].as_i64() else {
            log::info!("No Genius hits for album '{album}' by '{artist}'");
            return Ok(None);
        };

        let song = self.get(&format!("/songs/{song_id}")).await?;
        let Some(album_id) = song["response"]["song"]["album"]["id"].as_i64() else {
            return Ok(None);
        };

        let album = self.get(&format!("/albums/{album_id}")).await?;
        Ok(parse_album_description(&album))
    }

    /// Scrape the lyrics from a song page. `None` when the page has none.
    pub async fn fetch_lyrics(&self, song_url: &str) -> Result<Option<String>> {
        let html = self.http.get_page(song_url).await?;
        let lyrics = extract_lyrics(&html);
        if lyrics.trim().is_empty() {
            log::debug!("No lyrics containers found at {song_url}");
            return Ok(None);
        }
        Ok(Some(lyrics.chars().take(MAX_LYRICS_CHARS).collect()))
    }
}

fn first_hit(search: &Value) -> &Value {
    &search["response"]["hits"][0]["result"]
}

/// The album's `description_preview`, ignoring empty and `?` placeholders.
pub fn parse_album_description(album: &Value) -> Option<String> {
    non_empty_str(&album["response"]["album"]["description_preview"])
        .filter(|s| *s != "?")
        .map(str::to_string)
}

/// Plain-text lyrics from every `data-lyrics-container` block on the page.
pub fn extract_lyrics(html: &str) -> String {
    let Ok(container) = Selector::parse(r#"[data-lyrics-container="true"]"#) else {
        return String::new();
    };

    let document = Html::parse_document(html);
    let sections: Vec<String> = document
        .select(&container)
        .map(|element| element_text(element).trim().to_string())
        .filter(|section| !section.is_empty())
        .collect();

    collapse_blank_lines(&sections.join("\n"))
}

/// Text content with `<br>` turned into newlines.
fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RUNS: OnceLock<Option<Regex>> = OnceLock::new();
    match BLANK_RUNS.get_or_init(|| Regex::new(r"\n\s*\n(\s*\n)+").ok()) {
        Some(re) => re.replace_all(text, "\n\n").into_owned(),
        None => text.to_string(),
    }
}
