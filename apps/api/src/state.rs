use std::sync::Arc;

use crate::screening::questions::QuestionSource;
use crate::screening::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Pluggable question source. `StaticQuestionBank` without an API key,
    /// `GenerativeQuestionSource` otherwise.
    pub question_source: Arc<dyn QuestionSource>,
}
