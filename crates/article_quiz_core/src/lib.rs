pub mod domain;
pub mod generation;
pub mod history;
pub mod ports;
pub mod quiz;
pub mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use domain::{Article, ExternalIdentity, HistoryItem, NewArticle, QuizQuestion, User};
pub use generation::{GenerationError, MalformedCompletionError};
pub use ports::{
    ArticleStore, CompletionService, HistoryCache, IdentityVerifier, PortError, PortResult,
    UserDirectory,
};
pub use quiz::{AdvanceMode, QuizPhase, QuizSession};
pub use workflow::{Step, SummaryStatus, Workflow, WorkflowDeps, WorkflowError};
