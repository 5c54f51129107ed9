use anyhow::{Context, Result};

/// How the handler treats the résumé upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumePolicy {
    /// The file is required and its extracted text must be substantial.
    #[default]
    Strict,
    /// The file is optional; a placeholder stands in when it is missing
    /// or yields no text.
    Permissive,
}

/// Application configuration loaded from environment variables.
///
/// The Cloudflare credentials are intentionally optional at startup: the
/// service can boot and serve `/health` without them, and the analyzer
/// reports a configuration error on the first match request instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub cloudflare_account_id: Option<String>,
    pub cloudflare_api_token: Option<String>,
    pub resume_policy: ResumePolicy,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            cloudflare_account_id: optional_env("CLOUDFLARE_ACCOUNT_ID"),
            cloudflare_api_token: optional_env("CLOUDFLARE_API_TOKEN"),
            resume_policy: match std::env::var("RESUME_POLICY").as_deref() {
                Ok("permissive") => ResumePolicy::Permissive,
                _ => ResumePolicy::Strict,
            },
            rate_limit_max: std::env::var("RATE_LIMIT_MAX")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u32>()
                .context("RATE_LIMIT_MAX must be a positive integer")?,
            rate_limit_window_secs: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse::<u64>()
                .context("RATE_LIMIT_WINDOW_SECS must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns `None` for unset or empty variables. An empty credential is as
/// useless as a missing one, so both map to the same configuration error.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
