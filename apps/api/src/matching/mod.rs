//! Match pipeline — validation rules and orchestration for résumé/job
//! submissions. The axum handler itself lives in `handlers`.

pub mod handlers;

use axum::http::HeaderMap;

use crate::config::ResumePolicy;
use crate::errors::AppError;

pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;
/// Strict mode rejects extractions shorter than this; a scanned or image-only
/// PDF typically lands here.
pub const MIN_RESUME_TEXT_CHARS: usize = 50;
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;
/// Body ceiling for the whole multipart request: the file cap plus headroom
/// for boundaries and the job description field.
pub const MAX_BODY_BYTES: usize = MAX_RESUME_BYTES + 1024 * 1024;
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
/// Stand-in resume text in permissive mode when no usable file was given.
pub const RESUME_PLACEHOLDER: &str = "no resume provided";

/// Identifies the client for throttling: first hop of `x-forwarded-for`,
/// falling back to a shared sentinel when the header is absent or unusable.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Validates and trims the job description field.
pub fn validate_job_description(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "Job description must be at least {MIN_JOB_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Validates the uploaded file's declared media type and size.
pub fn validate_resume_upload(content_type: Option<&str>, size: usize) -> Result<(), AppError> {
    if content_type != Some(PDF_CONTENT_TYPE) {
        return Err(AppError::Validation(
            "Only PDF files are accepted".to_string(),
        ));
    }
    if size > MAX_RESUME_BYTES {
        return Err(AppError::Validation(
            "File size must be less than 10MB".to_string(),
        ));
    }
    Ok(())
}

/// Applies the configured policy to the extracted résumé text.
///
/// Strict rejects thin extractions; permissive substitutes the placeholder so
/// the analysis can still run on the job description alone.
pub fn apply_resume_policy(policy: ResumePolicy, extracted: String) -> Result<String, AppError> {
    match policy {
        ResumePolicy::Strict => {
            if extracted.chars().count() < MIN_RESUME_TEXT_CHARS {
                return Err(AppError::Validation(
                    "Could not extract enough text from the PDF. Please ensure the PDF contains readable text.".to_string(),
                ));
            }
            Ok(extracted)
        }
        ResumePolicy::Permissive => {
            if extracted.is_empty() {
                Ok(RESUME_PLACEHOLDER.to_string())
            } else {
                Ok(extracted)
            }
        }
    }
}
