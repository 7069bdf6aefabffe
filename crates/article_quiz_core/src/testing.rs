//! crates/article_quiz_core/src/testing.rs
//!
//! In-memory implementations of the ports, shared by the unit tests of this crate
//! and the router tests of the api service.

#![allow(missing_docs)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::{Article, ExternalIdentity, HistoryItem, NewArticle, QuizQuestion, User};
use crate::ports::{
    ArticleStore, CompletionService, HistoryCache, IdentityVerifier, PortError, PortResult,
    UserDirectory,
};

/// Five well-formed questions, serialized the way a model is asked to answer.
pub fn quiz_json() -> String {
    serde_json::to_string(&sample_questions()).expect("sample questions serialize")
}

pub fn sample_questions() -> Vec<QuizQuestion> {
    let rows = [
        ("When was De revolutionibus published?", "B. 1543"),
        ("Who wrote De revolutionibus?", "A. Copernicus"),
        ("What sits at the centre of the model?", "C. The Sun"),
        ("Which language was it written in?", "D. Latin"),
        ("Where was it printed?", "A. Nuremberg"),
    ];
    rows.iter()
        .map(|(question, answer)| {
            let letter = &answer[..1];
            let options = ["A", "B", "C", "D"]
                .iter()
                .map(|l| {
                    if *l == letter {
                        answer.to_string()
                    } else {
                        format!("{l}. Not {}", &answer[3..])
                    }
                })
                .collect();
            QuizQuestion {
                question: question.to_string(),
                options,
                answer: answer.to_string(),
            }
        })
        .collect()
}

//=========================================================================================
// CompletionService
//=========================================================================================

/// Replays a fixed list of responses and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<PortResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<PortResult<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Unexpected("no scripted response left".to_string())))
    }
}

//=========================================================================================
// ArticleStore
//=========================================================================================

#[derive(Default)]
pub struct InMemoryArticleStore {
    articles: Mutex<Vec<Article>>,
    fail: AtomicBool,
    creates: AtomicUsize,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `PortError::Unexpected`.
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Inserts an article created `age` ago.
    pub fn seed(&self, user_id: Uuid, title: &str, age: Duration) -> Article {
        let article = Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: format!("{title} content"),
            summary: format!("{title} summary"),
            user_id,
            created_at: Utc::now() - age,
        };
        self.articles.lock().unwrap().push(article.clone());
        article
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn all(&self) -> Vec<Article> {
        self.articles.lock().unwrap().clone()
    }

    fn check(&self) -> PortResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("article store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn create_article(&self, user_id: Uuid, article: &NewArticle) -> PortResult<Article> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let created = Article {
            id: Uuid::new_v4(),
            title: article.title.clone(),
            content: article.content.clone(),
            summary: article.summary.clone(),
            user_id,
            created_at: Utc::now(),
        };
        self.articles.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_articles_for_user(&self, user_id: Uuid) -> PortResult<Vec<Article>> {
        self.check()?;
        let mut owned: Vec<Article> = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}

//=========================================================================================
// UserDirectory
//=========================================================================================

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<Vec<User>>,
    fail: AtomicBool,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn insert(&self, external_id: Option<&str>, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            external_id: external_id.map(str::to_string),
            email: email.to_string(),
            name: None,
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    fn check(&self) -> PortResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("user directory unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn resolve_user(&self, identity: &ExternalIdentity) -> PortResult<User> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users
            .iter()
            .find(|u| u.external_id.as_deref() == Some(identity.external_id.as_str()))
        {
            return Ok(user.clone());
        }
        let email = identity.email.as_deref().ok_or(PortError::Unauthorized)?;
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            user.external_id = Some(identity.external_id.clone());
            user.name = identity.name.clone();
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            external_id: Some(identity.external_id.clone()),
            email: email.to_string(),
            name: identity.name.clone(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn sync_user(
        &self,
        external_id: &str,
        email: &str,
        name: Option<&str>,
    ) -> PortResult<User> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users
            .iter_mut()
            .find(|u| u.external_id.as_deref() == Some(external_id))
        {
            user.email = email.to_string();
            user.name = name.map(str::to_string);
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            external_id: Some(external_id.to_string()),
            email: email.to_string(),
            name: name.map(str::to_string),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn delete_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let position = users
            .iter()
            .position(|u| u.external_id.as_deref() == Some(external_id));
        Ok(position.map(|i| users.remove(i)))
    }
}

//=========================================================================================
// IdentityVerifier
//=========================================================================================

/// Accepts exactly the tokens it was given.
#[derive(Default)]
pub struct StaticIdentityVerifier {
    tokens: HashMap<String, ExternalIdentity>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, identity: ExternalIdentity) -> Self {
        self.tokens.insert(token.to_string(), identity);
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify_session_token(&self, token: &str) -> PortResult<ExternalIdentity> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(PortError::Unauthorized)
    }
}

//=========================================================================================
// HistoryCache
//=========================================================================================

#[derive(Default)]
pub struct InMemoryHistoryCache {
    items: Mutex<Vec<HistoryItem>>,
    fail: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryHistoryCache {
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn items(&self) -> Vec<HistoryItem> {
        self.items.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryCache for InMemoryHistoryCache {
    async fn load(&self) -> PortResult<Vec<HistoryItem>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("cache unreadable".to_string()));
        }
        Ok(self.items())
    }

    async fn store(&self, items: &[HistoryItem]) -> PortResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("cache unwritable".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.items.lock().unwrap() = items.to_vec();
        Ok(())
    }
}
