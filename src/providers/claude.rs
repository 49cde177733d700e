use super::http::ApiHttp;
use crate::headers::add_anthropic_headers;
use crate::{LinerNotesError, Result};
use http_types::{Body, Method};
use serde_json::{json, Value};

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-haiku-4-5-20251001";

/// Minimal Anthropic Messages API client asking for JSON answers.
#[derive(Clone)]
pub struct ClaudeClient {
    http: ApiHttp,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeClient {
    pub fn with_base_url(http: ApiHttp, api_key: String, model: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }

    /// Send `prompt` as a single user message and parse the reply as JSON.
    ///
    /// `context` only labels log and error messages.
    pub async fn complete_json(&self, context: &str, max_tokens: u32, prompt: &str) -> Result<Value> {
        let url = format!("{}/v1/messages", self.base_url);
        let mut request = ApiHttp::request(Method::Post, &url)?;
        add_anthropic_headers(&mut request, &self.api_key)?;

        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }]
        });
        request.set_body(Body::from_json(&body).map_err(|e| LinerNotesError::Http(e.to_string()))?);

        let response = self.http.send_json(request).await?;
        let text = reply_text(&response).ok_or_else(|| {
            LinerNotesError::Parse(format!("[{context}] unexpected response shape: {response}"))
        })?;

        parse_json_reply(text).map_err(|e| {
            log::debug!("[{context}] raw reply: {text}");
            LinerNotesError::Parse(format!("[{context}] reply is not JSON: {e}"))
        })
    }
}

/// The text of the first content block.
pub fn reply_text(response: &Value) -> Option<&str> {
    response["content"][0]["text"].as_str()
}

/// Parse a reply that may be wrapped in a markdown code fence.
pub fn parse_json_reply(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(strip_code_fences(text))
}

/// Removes ```json / ``` fences, at most once on each side.
pub fn strip_code_fences(s: &str) -> &str {
    let s = s.trim();
    let s = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}

/// A string field of a model reply, empty when absent.
pub(crate) fn reply_field(reply: &Value, field: &str) -> String {
    reply[field].as_str().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_strip_code_fences_only_once() {
        assert_eq!(strip_code_fences("``````"), "");
        assert_eq!(strip_code_fences("```json```json```"), "```json");
    }

    #[test]
    fn test_reply_text_and_parse() {
        let response = json!({
            "id": "msg_01",
            "type": "message",
            "content": [{
                "type": "text",
                "text": "```json\n{\"interpretation\": \"A late-night confession.\"}\n```"
            }]
        });

        let text = reply_text(&response).unwrap();
        let reply = parse_json_reply(text).unwrap();
        assert_eq!(reply_field(&reply, "interpretation"), "A late-night confession.");
        assert_eq!(reply_field(&reply, "missing"), "");
    }

    #[test]
    fn test_reply_text_unexpected_shape() {
        assert_eq!(reply_text(&json!({"error": {"type": "overloaded_error"}})), None);
    }

    #[test]
    fn test_parse_json_reply_rejects_prose() {
        assert!(parse_json_reply("Sure! Here is the analysis you asked for.").is_err());
    }
}
