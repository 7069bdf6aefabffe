//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ArticleStore` and `UserDirectory` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use article_quiz_core::domain::{Article, ExternalIdentity, NewArticle, User};
use article_quiz_core::ports::{ArticleStore, PortError, PortResult, UserDirectory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ArticleStore` and `UserDirectory` ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, external_id, email, name, created_at FROM users WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    external_id: Option<String>,
    email: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            external_id: self.external_id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ArticleRecord {
    id: Uuid,
    title: String,
    content: String,
    summary: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}
impl ArticleRecord {
    fn to_domain(self) -> Article {
        Article {
            id: self.id,
            title: self.title,
            content: self.content,
            summary: self.summary,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `ArticleStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ArticleStore for DbAdapter {
    async fn create_article(&self, user_id: Uuid, article: &NewArticle) -> PortResult<Article> {
        let record = sqlx::query_as::<_, ArticleRecord>(
            "INSERT INTO articles (id, title, content, summary, user_id) VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, title, content, summary, user_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.summary)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_articles_for_user(&self, user_id: Uuid) -> PortResult<Vec<Article>> {
        let records = sqlx::query_as::<_, ArticleRecord>(
            "SELECT id, title, content, summary, user_id, created_at FROM articles \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

//=========================================================================================
// `UserDirectory` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserDirectory for DbAdapter {
    async fn resolve_user(&self, identity: &ExternalIdentity) -> PortResult<User> {
        if let Some(user) = self.find_user_by_external_id(&identity.external_id).await? {
            return Ok(user);
        }

        let email = identity.email.as_deref().ok_or(PortError::Unauthorized)?;

        // Users entered before the identity provider knew them are claimed by email.
        let claimed = sqlx::query_as::<_, UserRecord>(
            "UPDATE users SET external_id = $1, name = $2, updated_at = NOW() WHERE email = $3 \
             RETURNING id, external_id, email, name, created_at",
        )
        .bind(&identity.external_id)
        .bind(&identity.name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        if let Some(record) = claimed {
            info!("Attached external id to existing user {}", record.id);
            return Ok(record.to_domain());
        }

        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, external_id, email, name) VALUES ($1, $2, $3, $4) \
             RETURNING id, external_id, email, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&identity.external_id)
        .bind(email)
        .bind(&identity.name)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        info!("Created user {}", record.id);
        Ok(record.to_domain())
    }

    async fn sync_user(
        &self,
        external_id: &str,
        email: &str,
        name: Option<&str>,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, external_id, email, name) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (external_id) DO UPDATE SET email = EXCLUDED.email, name = EXCLUDED.name, updated_at = NOW() \
             RETURNING id, external_id, email, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(external_id)
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "DELETE FROM users WHERE external_id = $1 \
             RETURNING id, external_id, email, name, created_at",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }
}
