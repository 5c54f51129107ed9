use std::sync::Arc;

use crate::analysis::MatchAnalyzer;
use crate::config::Config;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Process-wide throttle table. Owned here rather than as a module-level
    /// global so tests get isolated instances.
    pub limiter: Arc<RateLimiter>,
    /// Pluggable analyzer. Production: `WorkersAiAnalyzer`. Tests swap in stubs.
    pub analyzer: Arc<dyn MatchAnalyzer>,
}
