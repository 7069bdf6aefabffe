//! crates/article_quiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the database, the AI provider and the identity provider.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Article, ExternalIdentity, HistoryItem, NewArticle, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn create_article(&self, user_id: Uuid, article: &NewArticle) -> PortResult<Article>;

    /// Lists every article owned by the user, newest first.
    async fn list_articles_for_user(&self, user_id: Uuid) -> PortResult<Vec<Article>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Maps a verified identity onto an internal user, creating one on first sight.
    ///
    /// Lookup order is external id, then email (attaching the external id).
    /// Fails with `Unauthorized` when a new user would have to be created
    /// without an email.
    async fn resolve_user(&self, identity: &ExternalIdentity) -> PortResult<User>;

    /// Creates or updates the user owning `external_id`.
    async fn sync_user(
        &self,
        external_id: &str,
        email: &str,
        name: Option<&str>,
    ) -> PortResult<User>;

    /// Deletes the user owning `external_id`, returning it if it existed.
    async fn delete_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the generated text for a single prompt.
    async fn complete(&self, prompt: &str) -> PortResult<String>;
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies an identity-provider session token and returns its claims.
    async fn verify_session_token(&self, token: &str) -> PortResult<ExternalIdentity>;
}

/// The local fallback copy of the history list.
#[async_trait]
pub trait HistoryCache: Send + Sync {
    /// Reads the cached list. A cache that was never written yields an empty list.
    async fn load(&self) -> PortResult<Vec<HistoryItem>>;

    /// Replaces the cached list.
    async fn store(&self, items: &[HistoryItem]) -> PortResult<()>;
}
