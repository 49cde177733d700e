use crate::{LinerNotesError, Result};
use http_client::Request;

/// Common Chrome user agent string, needed for the lyrics pages
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Anthropic API version pinned by the Messages client
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Add common browser headers to a request
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept-Language", "en-US,en;q=0.9");
}

/// Add headers for JSON API calls
pub fn add_json_headers(request: &mut Request) {
    add_common_headers(request);
    let _ = request.insert_header("Accept", "application/json");
}

/// Add headers for regular HTML page requests
pub fn add_page_headers(request: &mut Request) {
    add_common_headers(request);
    let _ = request.insert_header(
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    );
}

/// Add a bearer token (Genius). Fails if the token is not a valid header value.
pub fn add_bearer_auth(request: &mut Request, token: &str) -> Result<()> {
    request
        .insert_header("Authorization", format!("Bearer {token}").as_str())
        .map_err(|_| {
            LinerNotesError::MissingCredentials("api.genius_token is not a valid header value")
        })?;
    Ok(())
}

/// Add the key and version headers the Anthropic API requires. Fails if the
/// key is not a valid header value.
pub fn add_anthropic_headers(request: &mut Request, api_key: &str) -> Result<()> {
    add_json_headers(request);
    request.insert_header("x-api-key", api_key).map_err(|_| {
        LinerNotesError::MissingCredentials("api.anthropic_key is not a valid header value")
    })?;
    let _ = request.insert_header("anthropic-version", ANTHROPIC_VERSION);
    let _ = request.insert_header("Content-Type", "application/json");
    Ok(())
}
