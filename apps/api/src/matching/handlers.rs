//! Axum handler for the match endpoint.

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::analysis::MatchResult;
use crate::config::ResumePolicy;
use crate::errors::AppError;
use crate::extraction;
use crate::matching::{
    apply_resume_policy, client_key, validate_job_description, validate_resume_upload,
    RESUME_PLACEHOLDER,
};
use crate::state::AppState;

/// Raw multipart fields before validation.
struct Submission {
    job_description: Option<String>,
    resume: Option<ResumeUpload>,
}

struct ResumeUpload {
    content_type: Option<String>,
    bytes: Bytes,
}

/// POST /api/v1/match
///
/// Throttle → validate → extract → analyze. Responds with the `MatchResult`
/// as the sole payload; every failure reduces to `{"error": message}`.
pub async fn handle_match(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<MatchResult>, AppError> {
    let key = client_key(&headers);
    let decision = state.limiter.check(
        &key,
        state.config.rate_limit_max,
        Duration::seconds(state.config.rate_limit_window_secs as i64),
    );
    if decision.limited {
        return Err(AppError::RateLimited {
            limit: state.config.rate_limit_max,
            reset_ms: decision.reset_at.timestamp_millis(),
            retry_after_secs: (decision.reset_at - Utc::now()).num_seconds(),
        });
    }

    let submission = read_submission(multipart).await?;

    if state.config.resume_policy == ResumePolicy::Strict && submission.resume.is_none() {
        return Err(AppError::Validation("Resume PDF is required".to_string()));
    }

    let job_text =
        validate_job_description(submission.job_description.as_deref().unwrap_or(""))?.to_string();

    let resume_text = match submission.resume {
        Some(upload) => {
            validate_resume_upload(upload.content_type.as_deref(), upload.bytes.len())?;
            let parsed = extraction::extract(&upload.bytes)?;
            debug!(
                "Extracted {} chars from {} page(s)",
                parsed.text.len(),
                parsed.page_count
            );
            apply_resume_policy(state.config.resume_policy, parsed.text)?
        }
        // Only reachable in permissive mode; strict bailed out above.
        None => RESUME_PLACEHOLDER.to_string(),
    };

    let result = state.analyzer.analyze(&resume_text, &job_text).await?;
    info!(score = result.score, "Match analysis complete");

    Ok(Json(result))
}

/// Drains the multipart stream into its two known fields, ignoring extras.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission {
        job_description: None,
        resume: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form submission: {e}")))?
    {
        // `text()`/`bytes()` consume the field, so take the name first.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("jobDescription") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid form submission: {e}")))?;
                submission.job_description = Some(text);
            }
            Some("resume") => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid form submission: {e}")))?;
                submission.resume = Some(ResumeUpload {
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(submission)
}
