//! Providers driven end to end through a scripted `HttpClient`.

use futures::io::{AsyncRead, BufReader};
use http_client::{Error, HttpClient, Request, Response};
use http_types::{Body, StatusCode};
use liner_notes::providers::{
    AlbumInfoProvider, ApiHttp, ArtworkProvider, ClaudeClient, GeniusClient, ItunesClient,
    LyricsAnalysisProvider,
};
use liner_notes::{AlbumInfo, EnrichmentProvider, LinerNotesError, LyricsAnalysis, TrackSnapshot};
use serde_json::{json, Value};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

const ITUNES: &str = "http://itunes.test";
const GENIUS: &str = "http://genius.test";
const ANTHROPIC: &str = "http://anthropic.test";
const TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
enum Reply {
    Json(u16, Value),
    Bytes(Vec<u8>, &'static str),
    Html(&'static str),
    /// Never answers.
    Stall,
    /// Headers after 15s, then a body that never finishes.
    SlowHeadersStalledBody,
}

/// Answers each request with the first route whose pattern occurs in the URL,
/// and 404 otherwise. Every request is logged with its body.
#[derive(Debug, Default)]
struct FakeHttp {
    routes: Vec<(&'static str, Reply)>,
    requests: Mutex<Vec<(String, String)>>,
}

impl FakeHttp {
    fn new() -> Self {
        Self::default()
    }

    fn route(mut self, pattern: &'static str, reply: Reply) -> Self {
        self.routes.push((pattern, reply));
        self
    }

    fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn requested(&self, pattern: &str) -> bool {
        self.requests().iter().any(|(url, _)| url.contains(pattern))
    }

    fn body_sent_to(&self, pattern: &str) -> String {
        self.requests()
            .into_iter()
            .find(|(url, _)| url.contains(pattern))
            .map(|(_, body)| body)
            .unwrap_or_default()
    }
}

/// A body reader that never produces anything.
struct Stalled;

impl AsyncRead for Stalled {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut [u8],
    ) -> Poll<std::io::Result<usize>> {
        Poll::Pending
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeHttp {
    async fn send(&self, mut req: Request) -> Result<Response, Error> {
        let url = req.url().to_string();
        let body = req.body_string().await.unwrap_or_default();
        self.requests.lock().unwrap().push((url.clone(), body));

        let reply = self
            .routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern))
            .map(|(_, reply)| reply.clone());

        let response = match reply {
            Some(Reply::Json(status, value)) => {
                let mut response = Response::new(status);
                response.set_body(Body::from_json(&value)?);
                response
            }
            Some(Reply::Bytes(bytes, content_type)) => {
                let mut response = Response::new(StatusCode::Ok);
                response.set_body(Body::from_bytes(bytes));
                let _ = response.insert_header("Content-Type", content_type);
                response
            }
            Some(Reply::Html(html)) => {
                let mut response = Response::new(StatusCode::Ok);
                response.set_body(Body::from_string(html.to_string()));
                response
            }
            Some(Reply::Stall) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Some(Reply::SlowHeadersStalledBody) => {
                tokio::time::sleep(Duration::from_secs(15)).await;
                let mut response = Response::new(StatusCode::Ok);
                response.set_body(Body::from_reader(BufReader::new(Stalled), None));
                response
            }
            None => Response::new(StatusCode::NotFound),
        };
        Ok(response)
    }
}

fn api(fake: &Arc<FakeHttp>) -> ApiHttp {
    ApiHttp::new(fake.clone(), TIMEOUT)
}

fn itunes(fake: &Arc<FakeHttp>) -> ItunesClient {
    ItunesClient::with_base_url(api(fake), ITUNES.to_string())
}

fn genius(fake: &Arc<FakeHttp>, token: &str) -> GeniusClient {
    GeniusClient::with_base_url(api(fake), token.to_string(), GENIUS.to_string())
}

fn claude(fake: &Arc<FakeHttp>) -> ClaudeClient {
    ClaudeClient::with_base_url(
        api(fake),
        "sk-ant-test".to_string(),
        "claude-test".to_string(),
        ANTHROPIC.to_string(),
    )
}

fn album_provider(fake: &Arc<FakeHttp>) -> AlbumInfoProvider {
    AlbumInfoProvider::new(
        itunes(fake),
        Some(genius(fake, "g-token")),
        Some(claude(fake)),
        "English".to_string(),
    )
}

fn lyrics_provider(fake: &Arc<FakeHttp>, token: &str) -> LyricsAnalysisProvider {
    LyricsAnalysisProvider::new(
        Some(genius(fake, token)),
        Some(claude(fake)),
        "English".to_string(),
    )
}

fn nightcall() -> TrackSnapshot {
    TrackSnapshot::new("Nightcall", "Kavinsky", "OutRun", true)
}

fn song_search(artwork_url: &str) -> Reply {
    Reply::Json(
        200,
        json!({ "resultCount": 1, "results": [{ "trackName": "Nightcall", "artworkUrl100": artwork_url }] }),
    )
}

fn no_genius_hits() -> Reply {
    Reply::Json(200, json!({ "meta": { "status": 200 }, "response": { "hits": [] } }))
}

fn claude_reply(text: &str) -> Reply {
    Reply::Json(
        200,
        json!({ "id": "msg_01", "type": "message", "content": [{ "type": "text", "text": text }] }),
    )
}

#[test_log::test(tokio::test)]
async fn test_artwork_fetches_the_600px_rendition() {
    let fake = Arc::new(
        FakeHttp::new()
            .route("entity=song", song_search("http://images.test/cover/100x100bb.jpg"))
            .route("images.test", Reply::Bytes(vec![0x89, b'P', b'N', b'G'], "image/png")),
    );

    let artwork = ArtworkProvider::new(itunes(&fake))
        .fetch(&nightcall())
        .await
        .unwrap()
        .expect("artwork");

    assert_eq!(artwork.url, "http://images.test/cover/600x600bb.jpg");
    assert_eq!(artwork.content_type, "image/png");
    assert_eq!(artwork.bytes, vec![0x89, b'P', b'N', b'G']);
    assert!(fake.requested("/cover/600x600bb.jpg"));
    assert!(!fake.requested("/cover/100x100bb.jpg"));
}

#[test_log::test(tokio::test)]
async fn test_artwork_with_empty_body_is_none() {
    let fake = Arc::new(
        FakeHttp::new()
            .route("entity=song", song_search("http://images.test/cover/100x100bb.jpg"))
            .route("images.test", Reply::Bytes(Vec::new(), "image/jpeg")),
    );

    let artwork = ArtworkProvider::new(itunes(&fake)).fetch(&nightcall()).await.unwrap();
    assert!(artwork.is_none());
}

#[test_log::test(tokio::test)]
async fn test_artwork_without_itunes_results_is_none() {
    let fake = Arc::new(
        FakeHttp::new().route("entity=song", Reply::Json(200, json!({ "resultCount": 0, "results": [] }))),
    );

    let artwork = ArtworkProvider::new(itunes(&fake)).fetch(&nightcall()).await.unwrap();
    assert!(artwork.is_none());
    assert_eq!(fake.requests().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_non_success_status_is_an_http_error() {
    let fake = Arc::new(
        FakeHttp::new().route("entity=song", Reply::Json(503, json!({ "errorMessage": "busy" }))),
    );

    let err = ArtworkProvider::new(itunes(&fake))
        .fetch(&nightcall())
        .await
        .unwrap_err();

    match err {
        LinerNotesError::Http(message) => assert!(message.contains("503"), "{message}"),
        other => panic!("expected an Http error, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_album_info_commits_when_lookups_fail() {
    let fake = Arc::new(
        FakeHttp::new()
            .route("entity=album", Reply::Json(500, json!({ "errorMessage": "oops" })))
            .route("genius.test/search", no_genius_hits())
            .route(
                "anthropic.test/v1/messages",
                claude_reply("```json\n{\"context\":\"ctx\",\"notable_fact\":\"nf\"}\n```"),
            ),
    );

    let info = album_provider(&fake).fetch(&nightcall()).await.unwrap();

    assert_eq!(
        info,
        Some(AlbumInfo {
            release_year: String::new(),
            genre: String::new(),
            context: "ctx".to_string(),
            notable_fact: "nf".to_string(),
        })
    );
    let prompt = fake.body_sent_to("anthropic.test");
    assert!(prompt.contains("Using what you know"), "{prompt}");
}

#[test_log::test(tokio::test)]
async fn test_album_info_uses_metadata_and_description() {
    let fake = Arc::new(
        FakeHttp::new()
            .route(
                "entity=album",
                Reply::Json(
                    200,
                    json!({ "results": [{
                        "collectionName": "OutRun",
                        "artistName": "Kavinsky",
                        "releaseDate": "2013-02-22T08:00:00Z",
                        "primaryGenreName": "Electronic"
                    }] }),
                ),
            )
            .route(
                "genius.test/search",
                Reply::Json(200, json!({ "response": { "hits": [{ "result": { "id": 11 } }] } })),
            )
            .route(
                "genius.test/songs/11",
                Reply::Json(200, json!({ "response": { "song": { "album": { "id": 22 } } } })),
            )
            .route(
                "genius.test/albums/22",
                Reply::Json(
                    200,
                    json!({ "response": { "album": { "description_preview": "Kavinsky's debut studio album." } } }),
                ),
            )
            .route(
                "anthropic.test/v1/messages",
                claude_reply("{\"context\":\"A synthwave road movie.\",\"notable_fact\":\"Drive.\"}"),
            ),
    );

    let info = album_provider(&fake).fetch(&nightcall()).await.unwrap().expect("album info");

    assert_eq!(info.release_year, "2013");
    assert_eq!(info.genre, "Electronic");
    assert_eq!(info.context, "A synthwave road movie.");
    assert_eq!(info.notable_fact, "Drive.");

    let request = fake.body_sent_to("anthropic.test");
    assert!(request.contains("Kavinsky's debut studio album."), "{request}");
    assert!(request.contains("released in 2013, genre: Electronic"), "{request}");
    assert!(request.contains("\"model\":\"claude-test\""), "{request}");
}

#[test_log::test(tokio::test)]
async fn test_lyrics_without_genius_hit_is_none() {
    let fake = Arc::new(
        FakeHttp::new()
            .route("genius.test/search", no_genius_hits())
            .route("anthropic.test", claude_reply("{\"interpretation\":\"unused\"}")),
    );

    let analysis = lyrics_provider(&fake, "g-token").fetch(&nightcall()).await.unwrap();

    assert!(analysis.is_none());
    assert!(!fake.requested("anthropic.test"));
}

#[test_log::test(tokio::test)]
async fn test_lyrics_page_is_scraped_into_the_prompt() {
    let fake = Arc::new(
        FakeHttp::new()
            .route(
                "genius.test/search",
                Reply::Json(
                    200,
                    json!({ "response": { "hits": [{ "result": {
                        "id": 11,
                        "url": "http://lyrics.test/kavinsky-nightcall-lyrics"
                    } }] } }),
                ),
            )
            .route(
                "lyrics.test",
                Reply::Html(
                    r#"<html><body><div data-lyrics-container="true">I'm giving you a night call<br>To tell you how I feel</div></body></html>"#,
                ),
            )
            .route(
                "anthropic.test/v1/messages",
                claude_reply("{\"interpretation\": \"A late-night confession.\"}"),
            ),
    );

    let analysis = lyrics_provider(&fake, "g-token").fetch(&nightcall()).await.unwrap();

    assert_eq!(
        analysis,
        Some(LyricsAnalysis {
            interpretation: "A late-night confession.".to_string(),
        })
    );
    let prompt = fake.body_sent_to("anthropic.test");
    assert!(prompt.contains("I'm giving you a night call"), "{prompt}");
}

#[test_log::test(tokio::test)]
async fn test_invalid_genius_token_fails_before_sending() {
    let fake = Arc::new(FakeHttp::new().route("genius.test/search", no_genius_hits()));

    let err = lyrics_provider(&fake, "tökén").fetch(&nightcall()).await.unwrap_err();

    assert!(matches!(err, LinerNotesError::MissingCredentials(_)), "{err:?}");
    assert!(fake.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stalled_response_times_out() {
    let fake = Arc::new(FakeHttp::new().route("entity=song", Reply::Stall));

    let err = ArtworkProvider::new(itunes(&fake))
        .fetch(&nightcall())
        .await
        .unwrap_err();

    assert!(matches!(err, LinerNotesError::Timeout(after) if after == TIMEOUT), "{err:?}");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_covers_headers_and_body_together() {
    let fake = Arc::new(
        FakeHttp::new()
            .route("entity=song", song_search("http://images.test/cover/100x100bb.jpg"))
            .route("images.test", Reply::SlowHeadersStalledBody),
    );

    let started = tokio::time::Instant::now();
    let err = ArtworkProvider::new(itunes(&fake))
        .fetch(&nightcall())
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, LinerNotesError::Timeout(_)), "{err:?}");
    assert!(elapsed >= TIMEOUT, "{elapsed:?}");
    assert!(elapsed < TIMEOUT + Duration::from_secs(1), "{elapsed:?}");
}
