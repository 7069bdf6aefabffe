//! crates/article_quiz_core/src/workflow.rs
//!
//! The compose → summarize → quiz wizard.
//!
//! The workflow owns the step state and the in-memory history list. Long-running
//! work (completion calls, article writes) is split into three parts so that a
//! caller can drive it without holding `&mut Workflow` across an await:
//! a ticket is issued by the workflow, `run_*` performs the I/O against
//! `WorkflowDeps`, and `apply_*` folds the outcome back in. Every step entry
//! bumps an epoch; outcomes carrying an older epoch are discarded.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{HistoryItem, NewArticle, QuizQuestion};
use crate::generation::{generate_quiz, generate_summary, GenerationError};
use crate::history::{local_history_id, reconcile};
use crate::ports::{ArticleStore, CompletionService, HistoryCache, PortError};
use crate::quiz::{AdvanceMode, QuizSession};

pub const NO_SUMMARY_MESSAGE: &str = "No summary generated.";

//=========================================================================================
// Dependencies and Errors
//=========================================================================================

/// Everything the workflow talks to, handed over at construction.
#[derive(Clone)]
pub struct WorkflowDeps {
    pub completion: Arc<dyn CompletionService>,
    pub articles: Arc<dyn ArticleStore>,
    pub cache: Arc<dyn HistoryCache>,
    /// The signed-in user, if any.
    pub current_user: Option<Uuid>,
    pub advance_mode: AdvanceMode,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Title and content are required")]
    MissingFields,
    #[error("Cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: Step, to: Step },
}

//=========================================================================================
// State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Compose,
    Summarize,
    Quiz,
}

/// What the summary slot currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryStatus {
    Idle,
    Loading,
    Ready { summary: String, saved: bool },
    /// A user-facing message shown in place of the summary.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub step: Step,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    /// Set when the summary came from history; suppresses regeneration.
    pub preloaded_summary: Option<String>,
    pub summary_status: SummaryStatus,
    pub quiz: Option<QuizSession>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            step: Step::Compose,
            title: String::new(),
            content: String::new(),
            summary: None,
            preloaded_summary: None,
            summary_status: SummaryStatus::Idle,
            quiz: None,
        }
    }
}

//=========================================================================================
// Tickets and Outcomes
//=========================================================================================

/// A request to generate and persist a summary for the captured article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTicket {
    epoch: u64,
    pub title: String,
    pub content: String,
}

#[derive(Debug)]
pub enum SummaryOutcome {
    /// The summary was generated and stored as an article.
    Persisted { summary: String, article_id: Uuid },
    /// The summary was generated but could not be stored.
    Unpersisted { summary: String, reason: String },
    Failed(GenerationError),
}

/// A request to generate a quiz for the captured article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizTicket {
    epoch: u64,
    pub title: String,
    pub content: String,
}

/// The result of entering the summarize step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryEntry {
    /// A history replay; nothing to generate.
    Preloaded,
    Generate(SummaryTicket),
}

//=========================================================================================
// Workflow
//=========================================================================================

pub struct Workflow {
    deps: WorkflowDeps,
    state: WorkflowState,
    history: Vec<HistoryItem>,
    epoch: u64,
}

impl Workflow {
    pub fn new(deps: WorkflowDeps) -> Self {
        Self {
            deps,
            state: WorkflowState::default(),
            history: Vec::new(),
            epoch: 0,
        }
    }

    pub fn deps(&self) -> &WorkflowDeps {
        &self.deps
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn quiz(&self) -> Option<&QuizSession> {
        self.state.quiz.as_ref()
    }

    pub fn quiz_mut(&mut self) -> Option<&mut QuizSession> {
        self.state.quiz.as_mut()
    }

    // --- History ---

    /// Loads the history list, preferring the server copy for a signed-in user.
    pub async fn initialize(&mut self) {
        let is_authenticated = self.deps.current_user.is_some();

        let server = match self.deps.current_user {
            Some(user_id) => match self.deps.articles.list_articles_for_user(user_id).await {
                Ok(articles) => Some(articles.into_iter().map(HistoryItem::from).collect()),
                Err(e) => {
                    warn!("Failed to fetch article history, using local cache: {:?}", e);
                    None
                }
            },
            None => None,
        };

        let local = if server.is_some() {
            Vec::new()
        } else {
            self.deps.cache.load().await.unwrap_or_else(|e| {
                warn!("Failed to read local history cache: {:?}", e);
                Vec::new()
            })
        };

        self.history = reconcile(server, local, is_authenticated);
        info!("History initialized with {} items.", self.history.len());
    }

    /// Prepends the current article to the history and writes the list through
    /// to the local cache.
    pub async fn save_to_history(&mut self, summary: &str, server_article_id: Option<Uuid>) {
        let now = Utc::now();
        let item = HistoryItem {
            id: server_article_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| local_history_id(now)),
            title: self.state.title.clone(),
            content: self.state.content.clone(),
            summary: summary.to_string(),
            created_at: now,
        };
        self.history.insert(0, item);

        if let Err(e) = self.deps.cache.store(&self.history).await {
            error!("Failed to write local history cache: {:?}", e);
        }
    }

    /// Replays a history entry: its summary is shown without calling the
    /// completion service or the article store.
    pub fn load_from_history(&mut self, item: &HistoryItem) {
        self.epoch += 1;
        self.state = WorkflowState {
            step: Step::Summarize,
            title: item.title.clone(),
            content: item.content.clone(),
            summary: Some(item.summary.clone()),
            preloaded_summary: Some(item.summary.clone()),
            summary_status: SummaryStatus::Ready {
                summary: item.summary.clone(),
                saved: true,
            },
            quiz: None,
        };
    }

    // --- Navigation ---

    /// Captures a new article and enters the summarize step.
    pub fn submit_article(
        &mut self,
        title: &str,
        content: &str,
    ) -> Result<SummaryEntry, WorkflowError> {
        if self.state.step != Step::Compose {
            return Err(WorkflowError::InvalidTransition {
                from: self.state.step,
                to: Step::Summarize,
            });
        }
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(WorkflowError::MissingFields);
        }
        self.state.title = title.to_string();
        self.state.content = content.to_string();
        self.state.preloaded_summary = None;
        Ok(self.enter_summarize())
    }

    /// Enters the summarize step, resetting its local state. Returns a ticket
    /// unless a preloaded summary makes generation unnecessary.
    pub fn enter_summarize(&mut self) -> SummaryEntry {
        self.epoch += 1;
        self.state.step = Step::Summarize;
        self.state.quiz = None;

        if let Some(summary) = self.state.preloaded_summary.clone() {
            self.state.summary = Some(summary.clone());
            self.state.summary_status = SummaryStatus::Ready {
                summary,
                saved: true,
            };
            return SummaryEntry::Preloaded;
        }

        self.state.summary = None;
        self.state.summary_status = SummaryStatus::Loading;
        SummaryEntry::Generate(SummaryTicket {
            epoch: self.epoch,
            title: self.state.title.clone(),
            content: self.state.content.clone(),
        })
    }

    /// Folds a summary outcome back in. Returns `false` if the ticket was stale.
    pub async fn apply_summary(
        &mut self,
        ticket: &SummaryTicket,
        outcome: SummaryOutcome,
    ) -> bool {
        if ticket.epoch != self.epoch || self.state.step != Step::Summarize {
            info!("Discarding stale summary result.");
            return false;
        }

        let (summary, article_id) = match outcome {
            SummaryOutcome::Persisted {
                summary,
                article_id,
            } => (summary, Some(article_id)),
            SummaryOutcome::Unpersisted { summary, reason } => {
                warn!("Summary was not persisted: {}", reason);
                (summary, None)
            }
            SummaryOutcome::Failed(GenerationError::Empty) => {
                self.state.summary_status = SummaryStatus::Failed(NO_SUMMARY_MESSAGE.to_string());
                return true;
            }
            SummaryOutcome::Failed(e) => {
                self.state.summary_status = SummaryStatus::Failed(format!("Error: {}", e));
                return true;
            }
        };

        self.state.summary = Some(summary.clone());
        self.save_to_history(&summary, article_id).await;
        self.state.summary_status = SummaryStatus::Ready {
            summary,
            saved: true,
        };
        true
    }

    /// Enters the summarize step and drives any generation to completion.
    pub async fn summarize(&mut self) -> &SummaryStatus {
        if let SummaryEntry::Generate(ticket) = self.enter_summarize() {
            let outcome = run_summary(&self.deps, &ticket).await;
            self.apply_summary(&ticket, outcome).await;
        }
        &self.state.summary_status
    }

    /// Moves from the summary to a fresh quiz attempt.
    pub fn start_quiz(&mut self) -> Result<QuizTicket, WorkflowError> {
        let has_summary = matches!(self.state.summary_status, SummaryStatus::Ready { .. });
        if self.state.step != Step::Summarize || !has_summary {
            return Err(WorkflowError::InvalidTransition {
                from: self.state.step,
                to: Step::Quiz,
            });
        }
        self.epoch += 1;
        self.state.step = Step::Quiz;
        self.state.quiz = Some(QuizSession::new(self.deps.advance_mode));
        Ok(QuizTicket {
            epoch: self.epoch,
            title: self.state.title.clone(),
            content: self.state.content.clone(),
        })
    }

    /// Loads generated questions into the attempt. Returns `false` if the ticket was stale.
    pub fn apply_quiz(
        &mut self,
        ticket: &QuizTicket,
        result: Result<Vec<QuizQuestion>, GenerationError>,
    ) -> bool {
        if ticket.epoch != self.epoch || self.state.step != Step::Quiz {
            info!("Discarding stale quiz result.");
            return false;
        }
        let Some(quiz) = self.state.quiz.as_mut() else {
            return false;
        };
        quiz.load(result.map_err(|e| e.to_string()));
        true
    }

    /// Enters the quiz step and drives the generation to completion.
    pub async fn take_quiz(&mut self) -> Result<&QuizSession, WorkflowError> {
        let ticket = self.start_quiz()?;
        let result = run_quiz(&self.deps, &ticket).await;
        self.apply_quiz(&ticket, result);
        self.state
            .quiz
            .as_ref()
            .ok_or(WorkflowError::InvalidTransition {
                from: Step::Quiz,
                to: Step::Quiz,
            })
    }

    /// Returns from the quiz to the summary already on screen.
    pub fn back_to_summary(&mut self) -> Result<(), WorkflowError> {
        if self.state.step != Step::Quiz {
            return Err(WorkflowError::InvalidTransition {
                from: self.state.step,
                to: Step::Summarize,
            });
        }
        self.state.preloaded_summary = self.state.summary.clone();
        self.enter_summarize();
        Ok(())
    }

    /// Resets to an empty compose step, abandoning any in-flight work.
    pub fn go_home(&mut self) {
        self.epoch += 1;
        self.state = WorkflowState::default();
    }
}

//=========================================================================================
// I/O
//=========================================================================================

/// Generates a summary and tries to persist it for the current user.
pub async fn run_summary(deps: &WorkflowDeps, ticket: &SummaryTicket) -> SummaryOutcome {
    let summary = match generate_summary(deps.completion.as_ref(), &ticket.content).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Failed to generate summary: {:?}", e);
            return SummaryOutcome::Failed(e);
        }
    };

    let Some(user_id) = deps.current_user else {
        return SummaryOutcome::Unpersisted {
            summary,
            reason: PortError::Unauthorized.to_string(),
        };
    };

    let article = NewArticle {
        title: ticket.title.clone(),
        content: ticket.content.clone(),
        summary: summary.clone(),
    };
    match deps.articles.create_article(user_id, &article).await {
        Ok(created) => SummaryOutcome::Persisted {
            summary,
            article_id: created.id,
        },
        Err(e) => {
            error!("Failed to save article: {:?}", e);
            SummaryOutcome::Unpersisted {
                summary,
                reason: e.to_string(),
            }
        }
    }
}

pub async fn run_quiz(
    deps: &WorkflowDeps,
    ticket: &QuizTicket,
) -> Result<Vec<QuizQuestion>, GenerationError> {
    generate_quiz(deps.completion.as_ref(), &ticket.title, &ticket.content)
        .await
        .map_err(|e| {
            error!("Failed to generate quiz: {:?}", e);
            e
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QuizPhase;
    use crate::testing::{
        quiz_json, InMemoryArticleStore, InMemoryHistoryCache, ScriptedCompletion,
    };
    use chrono::Duration;

    struct Harness {
        completion: Arc<ScriptedCompletion>,
        articles: Arc<InMemoryArticleStore>,
        cache: Arc<InMemoryHistoryCache>,
    }

    impl Harness {
        fn new(responses: Vec<Result<String, PortError>>) -> Self {
            Self {
                completion: Arc::new(ScriptedCompletion::new(responses)),
                articles: Arc::new(InMemoryArticleStore::new()),
                cache: Arc::new(InMemoryHistoryCache::default()),
            }
        }

        fn workflow(&self, current_user: Option<Uuid>) -> Workflow {
            Workflow::new(WorkflowDeps {
                completion: self.completion.clone(),
                articles: self.articles.clone(),
                cache: self.cache.clone(),
                current_user,
                advance_mode: AdvanceMode::AutoAdvance,
            })
        }
    }

    #[tokio::test]
    async fn submit_generates_persists_and_records_history() {
        let harness = Harness::new(vec![Ok("Plants make sugar.".to_string())]);
        let user = Uuid::new_v4();
        let mut workflow = harness.workflow(Some(user));

        workflow
            .submit_article("Photosynthesis", "Plants convert light...")
            .unwrap();
        workflow.summarize().await;

        let stored = harness.articles.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].summary, "Plants make sugar.");
        assert_eq!(workflow.history().len(), 1);
        assert_eq!(workflow.history()[0].id, stored[0].id.to_string());
        assert_eq!(harness.cache.items(), workflow.history());
        assert_eq!(
            workflow.state().summary_status,
            SummaryStatus::Ready {
                summary: "Plants make sugar.".to_string(),
                saved: true
            }
        );
    }

    #[tokio::test]
    async fn store_failure_still_records_local_history() {
        let harness = Harness::new(vec![Ok("Summary.".to_string())]);
        harness.articles.fail_all();
        let mut workflow = harness.workflow(Some(Uuid::new_v4()));

        workflow.submit_article("T", "C").unwrap();
        workflow.summarize().await;

        assert_eq!(workflow.history().len(), 1);
        assert!(Uuid::parse_str(&workflow.history()[0].id).is_err());
        assert_eq!(harness.cache.items().len(), 1);
        assert!(matches!(
            workflow.state().summary_status,
            SummaryStatus::Ready { saved: true, .. }
        ));
    }

    #[tokio::test]
    async fn anonymous_summary_is_kept_locally_only() {
        let harness = Harness::new(vec![Ok("Summary.".to_string())]);
        let mut workflow = harness.workflow(None);

        workflow.submit_article("T", "C").unwrap();
        workflow.summarize().await;

        assert_eq!(harness.articles.create_calls(), 0);
        assert_eq!(workflow.history().len(), 1);
    }

    #[tokio::test]
    async fn completion_failure_shows_error_and_skips_history() {
        let harness = Harness::new(vec![Err(PortError::Unexpected("quota".to_string()))]);
        let mut workflow = harness.workflow(Some(Uuid::new_v4()));

        workflow.submit_article("T", "C").unwrap();
        let status = workflow.summarize().await.clone();

        match status {
            SummaryStatus::Failed(message) => assert!(message.starts_with("Error: ")),
            other => panic!("unexpected status {:?}", other),
        }
        assert!(workflow.history().is_empty());
        assert_eq!(harness.articles.create_calls(), 0);
        assert_eq!(harness.cache.writes(), 0);
    }

    #[tokio::test]
    async fn empty_completion_shows_no_summary_message() {
        let harness = Harness::new(vec![Ok(String::new())]);
        let mut workflow = harness.workflow(None);
        workflow.submit_article("T", "C").unwrap();
        assert_eq!(
            workflow.summarize().await,
            &SummaryStatus::Failed(NO_SUMMARY_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn history_replay_makes_no_calls() {
        let harness = Harness::new(Vec::new());
        let user = Uuid::new_v4();
        harness.articles.seed(user, "Copernicus", Duration::days(2));
        let mut workflow = harness.workflow(Some(user));
        workflow.initialize().await;

        let item = workflow.history()[0].clone();
        workflow.load_from_history(&item);
        workflow.summarize().await;

        assert_eq!(harness.completion.calls(), 0);
        assert_eq!(harness.articles.create_calls(), 0);
        assert_eq!(workflow.history().len(), 1);
        assert_eq!(workflow.state().summary.as_deref(), Some("Copernicus summary"));
        assert_eq!(workflow.state().step, Step::Summarize);
    }

    #[tokio::test]
    async fn stale_summary_is_discarded_after_new_submission() {
        let harness = Harness::new(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
        ]);
        let mut workflow = harness.workflow(None);

        let SummaryEntry::Generate(first) = workflow.submit_article("One", "first text").unwrap()
        else {
            panic!("expected a ticket");
        };
        let first_outcome = run_summary(workflow.deps(), &first).await;

        workflow.go_home();
        let SummaryEntry::Generate(second) = workflow.submit_article("Two", "second text").unwrap()
        else {
            panic!("expected a ticket");
        };

        assert!(!workflow.apply_summary(&first, first_outcome).await);
        assert_eq!(workflow.state().summary_status, SummaryStatus::Loading);

        let second_outcome = run_summary(workflow.deps(), &second).await;
        assert!(workflow.apply_summary(&second, second_outcome).await);
        assert_eq!(workflow.history().len(), 1);
        assert_eq!(workflow.history()[0].title, "Two");
    }

    #[tokio::test]
    async fn initialize_prefers_server_history() {
        let harness = Harness::new(Vec::new());
        let user = Uuid::new_v4();
        harness.articles.seed(user, "older", Duration::days(3));
        harness.articles.seed(user, "newer", Duration::hours(1));
        harness.articles.seed(Uuid::new_v4(), "someone else", Duration::hours(2));
        harness
            .cache
            .store(&[HistoryItem {
                id: "1".to_string(),
                title: "cached".to_string(),
                content: String::new(),
                summary: String::new(),
                created_at: Utc::now(),
            }])
            .await
            .unwrap();

        let mut workflow = harness.workflow(Some(user));
        workflow.initialize().await;

        let titles: Vec<_> = workflow.history().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn initialize_falls_back_to_cache() {
        let harness = Harness::new(Vec::new());
        harness.articles.fail_all();
        let cached = vec![HistoryItem {
            id: "1700000000000".to_string(),
            title: "cached".to_string(),
            content: "c".to_string(),
            summary: "s".to_string(),
            created_at: Utc::now(),
        }];
        harness.cache.store(&cached).await.unwrap();

        let mut signed_in = harness.workflow(Some(Uuid::new_v4()));
        signed_in.initialize().await;
        assert_eq!(signed_in.history(), cached.as_slice());

        let mut anonymous = harness.workflow(None);
        anonymous.initialize().await;
        assert_eq!(anonymous.history(), cached.as_slice());
    }

    #[tokio::test]
    async fn save_to_history_prepends() {
        let harness = Harness::new(Vec::new());
        let mut workflow = harness.workflow(None);
        workflow.save_to_history("one", None).await;
        let id = Uuid::new_v4();
        workflow.save_to_history("two", Some(id)).await;

        assert_eq!(workflow.history().len(), 2);
        assert_eq!(workflow.history()[0].id, id.to_string());
        assert_eq!(workflow.history()[0].summary, "two");
    }

    #[tokio::test]
    async fn cache_write_failure_does_not_block_history() {
        let harness = Harness::new(Vec::new());
        harness.cache.fail_all();
        let mut workflow = harness.workflow(None);
        workflow.save_to_history("one", None).await;
        assert_eq!(workflow.history().len(), 1);
    }

    #[tokio::test]
    async fn full_quiz_round_trip() {
        let fenced = format!("```json\n{}\n```", quiz_json());
        let harness = Harness::new(vec![Ok("Summary.".to_string()), Ok(fenced)]);
        let mut workflow = harness.workflow(None);

        workflow.submit_article("Copernicus", "In 1543...").unwrap();
        workflow.summarize().await;
        let quiz = workflow.take_quiz().await.unwrap();
        assert_eq!(quiz.phase(), &QuizPhase::InProgress);
        assert_eq!(quiz.total(), 5);

        let answers: Vec<String> = quiz.questions().iter().map(|q| q.answer.clone()).collect();
        let quiz = workflow.quiz_mut().unwrap();
        for answer in &answers {
            quiz.select_option(answer);
        }
        assert_eq!(quiz.phase(), &QuizPhase::Completed);
        assert_eq!(quiz.score(), 5);

        quiz.retake();
        assert_eq!(quiz.score(), 0);
        assert_eq!(harness.completion.calls(), 2);
    }

    #[tokio::test]
    async fn malformed_quiz_fails_the_step() {
        let harness = Harness::new(vec![
            Ok("Summary.".to_string()),
            Ok("not json at all".to_string()),
        ]);
        let mut workflow = harness.workflow(None);
        workflow.submit_article("T", "C").unwrap();
        workflow.summarize().await;

        let quiz = workflow.take_quiz().await.unwrap();
        assert!(matches!(quiz.phase(), QuizPhase::Failed(_)));
    }

    #[tokio::test]
    async fn back_to_summary_does_not_regenerate() {
        let harness = Harness::new(vec![
            Ok("Summary.".to_string()),
            Ok(quiz_json()),
        ]);
        let mut workflow = harness.workflow(Some(Uuid::new_v4()));
        workflow.submit_article("T", "C").unwrap();
        workflow.summarize().await;
        workflow.take_quiz().await.unwrap();

        workflow.back_to_summary().unwrap();
        workflow.summarize().await;

        assert_eq!(harness.completion.calls(), 2);
        assert_eq!(harness.articles.create_calls(), 1);
        assert_eq!(workflow.state().summary.as_deref(), Some("Summary."));
    }

    #[tokio::test]
    async fn stale_quiz_is_discarded_after_leaving_the_quiz() {
        let harness = Harness::new(vec![Ok("Summary.".to_string()), Ok(quiz_json())]);
        let mut workflow = harness.workflow(None);
        workflow.submit_article("T", "C").unwrap();
        workflow.summarize().await;

        let ticket = workflow.start_quiz().unwrap();
        let result = run_quiz(workflow.deps(), &ticket).await;
        workflow.back_to_summary().unwrap();

        assert!(!workflow.apply_quiz(&ticket, result));
        assert!(workflow.quiz().is_none());
        assert_eq!(workflow.state().step, Step::Summarize);
    }

    #[tokio::test]
    async fn quiz_result_for_an_older_attempt_is_ignored() {
        let harness = Harness::new(vec![
            Ok("Summary.".to_string()),
            Ok(quiz_json()),
            Ok("not json".to_string()),
        ]);
        let mut workflow = harness.workflow(None);
        workflow.submit_article("T", "C").unwrap();
        workflow.summarize().await;

        let first = workflow.start_quiz().unwrap();
        let first_result = run_quiz(workflow.deps(), &first).await;
        workflow.back_to_summary().unwrap();
        let second = workflow.start_quiz().unwrap();

        assert!(!workflow.apply_quiz(&first, first_result));
        assert_eq!(workflow.quiz().map(|q| q.phase()), Some(&QuizPhase::Loading));

        let second_result = run_quiz(workflow.deps(), &second).await;
        assert!(workflow.apply_quiz(&second, second_result));
        assert!(matches!(workflow.quiz().map(|q| q.phase()), Some(QuizPhase::Failed(_))));
    }

    #[tokio::test]
    async fn go_home_resets_everything() {
        let harness = Harness::new(vec![Ok("Summary.".to_string())]);
        let mut workflow = harness.workflow(None);
        workflow.submit_article("T", "C").unwrap();
        workflow.summarize().await;

        workflow.go_home();
        let state = workflow.state();
        assert_eq!(state.step, Step::Compose);
        assert!(state.title.is_empty() && state.content.is_empty());
        assert!(state.summary.is_none());
        assert_eq!(workflow.history().len(), 1);
    }

    #[test]
    fn blank_fields_are_rejected() {
        let harness = Harness::new(Vec::new());
        let mut workflow = harness.workflow(None);
        assert_eq!(
            workflow.submit_article("  ", "content"),
            Err(WorkflowError::MissingFields)
        );
        assert_eq!(workflow.state().step, Step::Compose);
    }

    #[test]
    fn quiz_requires_a_summary() {
        let harness = Harness::new(Vec::new());
        let mut workflow = harness.workflow(None);
        assert!(workflow.start_quiz().is_err());
    }
}
