pub mod completion;
pub mod db;
pub mod history_cache;
pub mod identity;

pub use completion::OpenAiCompletionAdapter;
pub use db::DbAdapter;
pub use history_cache::JsonFileHistoryCache;
pub use identity::JwtIdentityVerifier;
