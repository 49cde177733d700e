use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::providers::album::DEFAULT_ALBUM_MAX_TOKENS;
use crate::providers::claude::{DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_CLAUDE_MODEL};
use crate::providers::genius::DEFAULT_GENIUS_BASE_URL;
use crate::providers::itunes::DEFAULT_ITUNES_BASE_URL;
use crate::providers::lyrics::DEFAULT_LYRICS_MAX_TOKENS;
use crate::source::SourceKind;
use serde::Deserialize;

/// Top-level settings.
///
/// File format: TOML
/// Default path: `<config dir>/liner-notes/config.toml` (see [`resolve_config_path`](super::resolve_config_path))
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LINER_NOTES__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub poll: PollSettings,
    pub source: SourceSettings,
    pub http: HttpSettings,
    pub claude: ClaudeSettings,
    pub endpoints: EndpointSettings,
}

/// Credentials. Album info and lyrics analysis need both.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub genius_token: Option<String>,
    pub anthropic_key: Option<String>,
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("ApiSettings")
            .field("genius_token", &redact(&self.genius_token))
            .field("anthropic_key", &redact(&self.anthropic_key))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Time between player queries (milliseconds).
    pub interval_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// `apple-music`, `playerctl` or `command`.
    pub kind: SourceKind,
    /// Program to run when `kind = "command"`.
    pub program: Option<String>,
    pub args: Vec<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::platform_default(),
            program: None,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout for every provider call (seconds).
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 20 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClaudeSettings {
    pub model: String,
    /// Language the album context and lyrics interpretation are written in.
    pub language: String,
    pub album_max_tokens: u32,
    pub lyrics_max_tokens: u32,
}

impl Default for ClaudeSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_CLAUDE_MODEL.to_string(),
            language: "English".to_string(),
            album_max_tokens: DEFAULT_ALBUM_MAX_TOKENS,
            lyrics_max_tokens: DEFAULT_LYRICS_MAX_TOKENS,
        }
    }
}

/// Base URLs, overridable for proxies and local test servers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    pub itunes: String,
    pub genius: String,
    pub anthropic: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            itunes: DEFAULT_ITUNES_BASE_URL.to_string(),
            genius: DEFAULT_GENIUS_BASE_URL.to_string(),
            anthropic: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
        }
    }
}
