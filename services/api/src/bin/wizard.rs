//! services/api/src/bin/wizard.rs
//!
//! A terminal front end for the compose → summarize → quiz workflow. History is
//! read from the server for `WIZARD_EXTERNAL_ID` when that user can be resolved,
//! and from the local JSON cache otherwise.

use api_lib::{
    adapters::{DbAdapter, JsonFileHistoryCache, OpenAiCompletionAdapter},
    config::Config,
    error::ApiError,
};
use article_quiz_core::{
    domain::ExternalIdentity,
    history::relative_label,
    ports::UserDirectory,
    quiz::{AdvanceMode, QuizPhase, Selection},
    workflow::{SummaryStatus, Workflow, WorkflowDeps},
};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Line-oriented prompts over stdin. `None` means stdin is closed.
struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, prompt: &str) -> Result<Option<String>, ApiError> {
        println!("{prompt}");
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    /// Reads lines until one consisting of a single `.`.
    async fn ask_block(&mut self, prompt: &str) -> Result<Option<String>, ApiError> {
        println!("{prompt} (finish with a line containing only '.')");
        let mut block = Vec::new();
        loop {
            match self.lines.next_line().await? {
                Some(line) if line.trim() == "." => return Ok(Some(block.join("\n"))),
                Some(line) => block.push(line),
                None if block.is_empty() => return Ok(None),
                None => return Ok(Some(block.join("\n"))),
            }
        }
    }
}

enum Screen {
    Home,
    Summary,
    Quiz,
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let api_key = config
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| ApiError::Internal("GEMINI_API_KEY is required".to_string()))?;
    let completion = Arc::new(OpenAiCompletionAdapter::from_key(
        api_key,
        &config.completion_api_base,
        config.completion_model.clone(),
    ));

    let db_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    db_adapter.run_migrations().await?;

    let current_user =
        resolve_wizard_user(&db_adapter, config.wizard_external_id.as_deref()).await;
    let cache = Arc::new(JsonFileHistoryCache::in_dir(&config.history_cache_dir));
    info!("Local history cache at {}", cache.path().display());

    let mut workflow = Workflow::new(WorkflowDeps {
        completion,
        articles: db_adapter,
        cache,
        current_user,
        advance_mode: AdvanceMode::AutoAdvance,
    });
    workflow.initialize().await;

    let mut prompter = Prompter::new();
    let mut screen = Screen::Home;
    loop {
        screen = match screen {
            Screen::Home => home(&mut workflow, &mut prompter).await?,
            Screen::Summary => summary(&mut workflow, &mut prompter).await?,
            Screen::Quiz => quiz(&mut workflow, &mut prompter).await?,
            Screen::Quit => break,
        };
    }
    Ok(())
}

async fn resolve_wizard_user(users: &DbAdapter, external_id: Option<&str>) -> Option<Uuid> {
    let external_id = external_id?;
    let identity = ExternalIdentity {
        external_id: external_id.to_string(),
        email: None,
        name: None,
    };
    match users.resolve_user(&identity).await {
        Ok(user) => {
            info!("Signed in as {}", user.email);
            Some(user.id)
        }
        Err(e) => {
            warn!("Could not resolve {}, continuing signed out: {:?}", external_id, e);
            None
        }
    }
}

//=========================================================================================
// Screens
//=========================================================================================

async fn home(workflow: &mut Workflow, prompter: &mut Prompter) -> Result<Screen, ApiError> {
    let now = Utc::now();
    println!("\n=== Article Quiz ===");
    if workflow.history().is_empty() {
        println!("No articles yet.");
    }
    for (i, item) in workflow.history().iter().enumerate() {
        println!("  [{}] {} ({})", i + 1, item.title, relative_label(item.created_at, now));
    }

    let Some(choice) = prompter
        .ask("[n] new article, [number] open from history, [q] quit")
        .await?
    else {
        return Ok(Screen::Quit);
    };

    match choice.as_str() {
        "q" => Ok(Screen::Quit),
        "n" => {
            let Some(title) = prompter.ask("Title:").await? else {
                return Ok(Screen::Quit);
            };
            let Some(content) = prompter.ask_block("Content:").await? else {
                return Ok(Screen::Quit);
            };
            match workflow.submit_article(&title, &content) {
                Ok(_) => {
                    println!("Summarizing...");
                    workflow.summarize().await;
                    Ok(Screen::Summary)
                }
                Err(e) => {
                    println!("{e}");
                    Ok(Screen::Home)
                }
            }
        }
        other => {
            let item = other
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| workflow.history().get(i))
                .cloned();
            match item {
                Some(item) => {
                    workflow.load_from_history(&item);
                    Ok(Screen::Summary)
                }
                None => {
                    println!("Unknown choice '{other}'");
                    Ok(Screen::Home)
                }
            }
        }
    }
}

async fn summary(workflow: &mut Workflow, prompter: &mut Prompter) -> Result<Screen, ApiError> {
    let state = workflow.state();
    println!("\n=== {} ===", state.title);
    let ready = match &state.summary_status {
        SummaryStatus::Ready { summary, .. } => {
            println!("{summary}");
            true
        }
        SummaryStatus::Failed(message) => {
            println!("{message}");
            false
        }
        SummaryStatus::Idle | SummaryStatus::Loading => false,
    };

    let menu = if ready {
        "[t] take the quiz, [h] home"
    } else {
        "[h] home"
    };
    loop {
        let Some(choice) = prompter.ask(menu).await? else {
            return Ok(Screen::Quit);
        };
        match choice.as_str() {
            "h" => {
                workflow.go_home();
                return Ok(Screen::Home);
            }
            "t" if ready => {
                println!("Generating quiz...");
                return match workflow.take_quiz().await {
                    Ok(_) => Ok(Screen::Quiz),
                    Err(e) => {
                        println!("{e}");
                        Ok(Screen::Summary)
                    }
                };
            }
            _ => println!("Unknown choice '{choice}'"),
        }
    }
}

async fn quiz(workflow: &mut Workflow, prompter: &mut Prompter) -> Result<Screen, ApiError> {
    loop {
        let Some(session) = workflow.quiz() else {
            return Ok(Screen::Summary);
        };

        match session.phase().clone() {
            QuizPhase::Loading => return Ok(Screen::Summary),
            QuizPhase::Failed(message) => {
                println!("Error: {message}");
                return after_quiz(workflow, prompter, false).await;
            }
            QuizPhase::Completed => {
                println!("\nScore: {}/{}", session.score(), session.total());
                for (i, row) in session.review().iter().enumerate() {
                    let mark = if row.correct { "✓" } else { "✗" };
                    println!(
                        "{} {}. {} (you: {})",
                        mark,
                        i + 1,
                        row.question,
                        row.chosen.as_deref().unwrap_or("-")
                    );
                    if let Some(answer) = &row.correct_answer {
                        println!("     correct: {answer}");
                    }
                }
                return after_quiz(workflow, prompter, true).await;
            }
            QuizPhase::InProgress => {}
        }

        let Some(question) = session.current_question().cloned() else {
            return Ok(Screen::Summary);
        };
        println!(
            "\nQuestion {} of {}: {}",
            session.current_index() + 1,
            session.total(),
            question.question
        );
        for (i, option) in question.options.iter().enumerate() {
            println!("  [{}] {}", i + 1, option);
        }

        let Some(choice) = prompter.ask("Your answer:").await? else {
            return Ok(Screen::Quit);
        };
        let option = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| question.options.get(i));
        let Some(option) = option else {
            println!("Pick a number between 1 and {}", question.options.len());
            continue;
        };
        if let Some(session) = workflow.quiz_mut() {
            match session.select_option(option) {
                Selection::Recorded { correct: true } => println!("Correct!"),
                Selection::Recorded { correct: false } => {
                    println!("Wrong, the answer was {}", question.answer)
                }
                Selection::Pending | Selection::Ignored => {}
            }
        }
    }
}

async fn after_quiz(
    workflow: &mut Workflow,
    prompter: &mut Prompter,
    can_retake: bool,
) -> Result<Screen, ApiError> {
    let menu = if can_retake {
        "[r] retake, [b] back to summary, [h] home"
    } else {
        "[b] back to summary, [h] home"
    };
    loop {
        let Some(choice) = prompter.ask(menu).await? else {
            return Ok(Screen::Quit);
        };
        match choice.as_str() {
            "r" if can_retake => {
                if let Some(session) = workflow.quiz_mut() {
                    session.retake();
                }
                return Ok(Screen::Quiz);
            }
            "b" => {
                if let Err(e) = workflow.back_to_summary() {
                    warn!("{}", e);
                }
                return Ok(Screen::Summary);
            }
            "h" => {
                workflow.go_home();
                return Ok(Screen::Home);
            }
            _ => println!("Unknown choice '{choice}'"),
        }
    }
}
