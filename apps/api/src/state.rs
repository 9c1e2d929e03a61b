use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::llm_client::LlmClient;
use crate::matching::SkillMatcher;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend. `PgStore` in production.
    pub store: Arc<dyn Store>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub llm: LlmClient,
    /// Pluggable skill matcher. Default: KeywordSkillMatcher. Swap via ENABLE_LLM_SKILL_MATCH.
    pub skill_matcher: Arc<dyn SkillMatcher>,
}
