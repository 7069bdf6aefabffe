//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every handler.

use article_quiz_core::ports::{ArticleStore, CompletionService, IdentityVerifier, UserDirectory};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<dyn ArticleStore>,
    pub users: Arc<dyn UserDirectory>,
    /// `None` when no completion API key is configured.
    pub completion: Option<Arc<dyn CompletionService>>,
    /// `None` when no session-token key is configured; protected routes then
    /// reject every request.
    pub identity: Option<Arc<dyn IdentityVerifier>>,
    pub webhook_secret: Option<String>,
}
