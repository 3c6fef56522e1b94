use std::sync::Arc;

use crate::analysis::extractor::ResumeExtractor;
use crate::analysis::rubric::RubricCatalog;
use crate::applications::store::ApplicationStore;
use crate::config::Config;
use crate::llm_client::AnalysisModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Keyword tables and rubric corpus location. Read-only after startup.
    pub rubrics: Arc<RubricCatalog>,
    pub extractor: Arc<dyn ResumeExtractor>,
    /// Default: `LlmClient` against the hosted model.
    pub model: Arc<dyn AnalysisModel>,
    pub store: Arc<dyn ApplicationStore>,
}
