//! AI match analysis — the single point of entry for all Workers AI calls.
//!
//! No other module may call the inference provider directly. The provider's
//! reply is free text that should contain a JSON object; this module recovers
//! that object defensively and never trusts its contents verbatim.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::errors::AppError;

pub mod prompts;

const CLOUDFLARE_API: &str = "https://api.cloudflare.com/client/v4/accounts";
/// The model used for all match analysis calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";
const MAX_TOKENS: u32 = 1500;
/// The reference behavior had no outbound timeout at all; this bound keeps a
/// hung provider from pinning a request slot indefinitely.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_SCORE: i64 = 50;
const DEFAULT_SUMMARY: &str = "Analysis completed.";

/// Structured outcome of comparing a résumé against a job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Overall fit, always within [0, 100].
    pub score: i64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub suggestions: Vec<String>,
}

/// The analyzer seam. `AppState` carries an `Arc<dyn MatchAnalyzer>` so
/// handler tests can substitute a stub without touching routing code.
#[async_trait]
pub trait MatchAnalyzer: Send + Sync {
    async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<MatchResult, AppError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct WorkersAiRequest {
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WorkersAiResponse {
    result: Option<WorkersAiResult>,
}

#[derive(Debug, Deserialize)]
struct WorkersAiResult {
    response: Option<String>,
}

/// Production analyzer backed by the Cloudflare Workers AI REST API.
///
/// Credentials are held as optionals and checked per call: their absence is a
/// configuration error surfaced to the client, not a boot failure.
pub struct WorkersAiAnalyzer {
    client: Client,
    account_id: Option<String>,
    api_token: Option<String>,
}

impl WorkersAiAnalyzer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            account_id: config.cloudflare_account_id.clone(),
            api_token: config.cloudflare_api_token.clone(),
        }
    }
}

#[async_trait]
impl MatchAnalyzer for WorkersAiAnalyzer {
    /// Single attempt, no retries: the reference behavior performs exactly one
    /// call and surfaces whatever happens.
    async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<MatchResult, AppError> {
        let (account_id, api_token) = match (&self.account_id, &self.api_token) {
            (Some(account_id), Some(api_token)) => (account_id, api_token),
            _ => return Err(AppError::Configuration),
        };

        let request_body = WorkersAiRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::MATCH_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompts::build_user_prompt(resume_text, job_text),
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{CLOUDFLARE_API}/{account_id}/ai/run/{MODEL}");
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::Error::new(e).context("inference request failed"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: WorkersAiResponse = response.json().await.map_err(|e| {
            AppError::Internal(anyhow::Error::new(e).context("reading inference response body"))
        })?;

        let reply = envelope
            .result
            .and_then(|r| r.response)
            .ok_or_else(|| AppError::ResponseParse("Invalid response from Cloudflare AI".into()))?;

        debug!("Inference reply: {} chars", reply.len());
        parse_match_result(&reply)
    }
}

/// Recovers and sanitizes a `MatchResult` from a free-text model reply.
pub fn parse_match_result(reply: &str) -> Result<MatchResult, AppError> {
    let span = extract_json_span(reply)
        .ok_or_else(|| AppError::ResponseParse("No JSON found in AI response".into()))?;

    let value: Value = serde_json::from_str(span).map_err(|_| {
        AppError::ResponseParse("Failed to parse AI response. Please try again.".into())
    })?;

    Ok(sanitize(&value))
}

/// Greedy first-`{` to last-`}` span. Known weakness: a stray `}` inside a
/// string literal before the real closing brace breaks it. Kept for
/// compatibility with the reference recovery behavior.
fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Coerces untrusted provider JSON into a well-formed `MatchResult`.
///
/// Out-of-range or non-numeric scores, missing summaries, and non-list
/// fields all degrade to safe defaults rather than failing the request.
fn sanitize(value: &Value) -> MatchResult {
    let score = match value.get("score").and_then(Value::as_f64) {
        Some(n) => n.clamp(0.0, 100.0).round() as i64,
        None => DEFAULT_SCORE,
    };

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SUMMARY)
        .to_string();

    MatchResult {
        score,
        summary,
        strengths: string_list(value.get("strengths")),
        gaps: string_list(value.get("gaps")),
        suggestions: string_list(value.get("suggestions")),
    }
}

/// Keeps the field only if the provider returned an array; non-string items
/// within an array are dropped rather than stringified.
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_span_plain_object() {
        assert_eq!(extract_json_span(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_extract_json_span_with_surrounding_prose() {
        let reply = r#"Sure! Here is the analysis: {"score": 80} Hope that helps."#;
        assert_eq!(extract_json_span(reply), Some(r#"{"score": 80}"#));
    }

    #[test]
    fn test_extract_json_span_absent() {
        assert_eq!(extract_json_span("no braces here"), None);
        assert_eq!(extract_json_span("} backwards {"), None);
    }

    #[test]
    fn test_no_json_found_is_a_distinct_error() {
        let err = parse_match_result("I could not produce a result.").unwrap_err();
        assert_eq!(err.to_string(), "No JSON found in AI response");
    }

    #[test]
    fn test_malformed_span_is_a_parse_error() {
        let err = parse_match_result("{score: not json}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to parse AI response. Please try again."
        );
    }

    #[test]
    fn test_sanitize_prose_wrapped_reply_with_bad_fields() {
        // Provider editorializes, overshoots the score, and returns a string
        // where a list is expected.
        let reply = r#"I think this matches well. {"score": 150, "summary": "Good fit", "strengths": ["X"], "gaps": [], "suggestions": "not a list"}"#;
        let result = parse_match_result(reply).unwrap();

        assert_eq!(result.score, 100);
        assert_eq!(result.summary, "Good fit");
        assert_eq!(result.strengths, vec!["X".to_string()]);
        assert!(result.gaps.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_sanitize_clamps_negative_score() {
        let result = parse_match_result(r#"{"score": -20}"#).unwrap();
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_sanitize_defaults_non_numeric_score() {
        let result = parse_match_result(r#"{"score": "eighty"}"#).unwrap();
        assert_eq!(result.score, 50);
    }

    #[test]
    fn test_sanitize_defaults_missing_summary() {
        let result = parse_match_result(r#"{"score": 70}"#).unwrap();
        assert_eq!(result.summary, "Analysis completed.");
    }

    #[test]
    fn test_sanitize_defaults_blank_summary() {
        let result = parse_match_result(r#"{"score": 70, "summary": "  "}"#).unwrap();
        assert_eq!(result.summary, "Analysis completed.");
    }

    #[test]
    fn test_sanitize_drops_non_string_list_items() {
        let result =
            parse_match_result(r#"{"strengths": ["Rust", 42, null, "Tokio"]}"#).unwrap();
        assert_eq!(result.strengths, vec!["Rust".to_string(), "Tokio".to_string()]);
    }

    #[test]
    fn test_sanitize_fractional_score_rounds_within_range() {
        let result = parse_match_result(r#"{"score": 86.6}"#).unwrap();
        assert_eq!(result.score, 87);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_fast_without_network() {
        let analyzer = WorkersAiAnalyzer {
            client: Client::new(),
            account_id: None,
            api_token: Some("token".into()),
        };
        let err = analyzer.analyze("resume", "job").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration));
    }
}
