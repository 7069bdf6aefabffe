//! crates/article_quiz_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs are independent of any database or transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An article a user submitted, together with the summary generated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// The fields a caller supplies to create an `Article`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub summary: String,
}

impl NewArticle {
    /// Returns the names of the fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("content", &self.content),
            ("summary", &self.summary),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The verified claims of an identity-provider session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// The client-visible projection of an `Article`, as listed in the history sidebar
/// and mirrored into the local history cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// The article UUID for server-backed items, or a millisecond timestamp
    /// for items that were never persisted.
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl From<Article> for HistoryItem {
    fn from(article: Article) -> Self {
        Self {
            id: article.id.to_string(),
            title: article.title,
            content: article.content,
            summary: article.summary,
            created_at: article.created_at,
        }
    }
}

/// A single multiple-choice question. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }
}
