use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant reduces to a flat `{"error": message}` body — the message
/// string is surfaced, internal detail (backtraces, source chains) is not.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited {
        limit: u32,
        /// Window reset as unix milliseconds, mirrored into `X-RateLimit-Reset`.
        reset_ms: i64,
        /// Whole seconds until reset, minimum 1, mirrored into `Retry-After`.
        retry_after_secs: i64,
    },

    #[error("Failed to parse PDF: {0}")]
    Extraction(String),

    #[error("Missing Cloudflare credentials. Please set CLOUDFLARE_ACCOUNT_ID and CLOUDFLARE_API_TOKEN environment variables.")]
    Configuration,

    #[error("Cloudflare API error: {status} - {body}")]
    Provider { status: u16, body: String },

    #[error("{0}")]
    ResponseParse(String),

    /// Displays the top-level context message only; the full chain goes to
    /// the log, never to the client.
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::Extraction(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Configuration | AppError::Provider { .. } | AppError::ResponseParse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if let AppError::Provider { status, body } = &self {
            tracing::error!("Inference provider returned {status}: {body}");
        }
        if let AppError::ResponseParse(msg) = &self {
            tracing::error!("Failed to parse AI response: {msg}");
        }

        let message = self.to_string();
        let mut response = (status, Json(json!({ "error": message }))).into_response();

        if let AppError::RateLimited {
            limit,
            reset_ms,
            retry_after_secs,
        } = self
        {
            let headers = response.headers_mut();
            insert_header(headers, "x-ratelimit-limit", limit.to_string());
            insert_header(headers, "x-ratelimit-remaining", "0".to_string());
            insert_header(headers, "x-ratelimit-reset", reset_ms.to_string());
            insert_header(headers, "retry-after", retry_after_secs.max(1).to_string());
        }

        response
    }
}

fn insert_header(headers: &mut axum::http::HeaderMap, name: &'static str, value: String) {
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(name, value);
    }
}
