use std::time::Duration;
use thiserror::Error;

/// Error types for now-playing lookups.
///
/// None of these ever reach the presentation layer: track source failures are
/// logged by the poller and provider failures are folded into
/// [`EnrichmentState::Unavailable`](crate::EnrichmentState::Unavailable) by the
/// dispatcher that issued the call.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use liner_notes::providers::ItunesClient;
/// use liner_notes::LinerNotesError;
///
/// # tokio_test::block_on(async {
/// let http = std::sync::Arc::new(http_client::native::NativeClient::new());
/// let itunes = ItunesClient::new(http, std::time::Duration::from_secs(20));
///
/// match itunes.song_artwork_url("Nightcall", "Kavinsky").await {
///     Ok(Some(url)) => println!("Artwork at {url}"),
///     Ok(None) => println!("No artwork"),
///     Err(LinerNotesError::Timeout(after)) => eprintln!("Gave up after {after:?}"),
///     Err(e) => eprintln!("Lookup failed: {e}"),
/// }
/// # });
/// ```
#[derive(Error, Debug)]
pub enum LinerNotesError {
    /// HTTP/network related errors, including non-success status codes.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response (JSON, HTML or player output) did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The media player query could not be run or reported a failure.
    #[error("Track source error: {0}")]
    Source(String),

    /// An enrichment needs an API credential that is not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// A provider request exceeded its configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Spawning the track source command or other I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
