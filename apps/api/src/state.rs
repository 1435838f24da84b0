use std::sync::Arc;

use crate::config::Config;
use crate::resume::extraction::ResumeExtractor;
use crate::resume::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Pluggable extraction collaborator. Default: LlmResumeExtractor.
    pub extractor: Arc<dyn ResumeExtractor>,
    pub config: Config,
}
