//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI document.

use crate::web::state::AppState;
use article_quiz_core::domain::{Article, NewArticle, QuizQuestion, User};
use article_quiz_core::generation::{generate_quiz, generate_summary};
use article_quiz_core::ports::CompletionService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

pub const MISSING_API_KEY: &str = "GEMINI_API_KEY is not set in environment variables";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_articles_handler,
        create_article_handler,
        summarize_handler,
        quiz_handler,
        crate::web::webhook::clerk_webhook_handler,
    ),
    components(
        schemas(
            ArticleResponse,
            CreateArticleRequest,
            SummarizeRequest,
            SummarizeResponse,
            QuizRequest,
            QuizResponse,
            QuizQuestionBody,
            ErrorResponse
        )
    ),
    tags(
        (name = "Article Quiz API", description = "Summaries, quizzes and article history.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The JSON body of every failed API request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            content: article.content,
            summary: article.summary,
            user_id: article.user_id,
            created_at: article.created_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct QuizRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuizQuestionBody {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl From<QuizQuestion> for QuizQuestionBody {
    fn from(q: QuizQuestion) -> Self {
        Self {
            question: q.question,
            options: q.options,
            answer: q.answer,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestionBody>,
}

/// Returns the text if it is present and not blank.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Unwraps a JSON body, turning extractor rejections into the `{error}` contract.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HandlerError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        reject(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })
}

fn completion_service(state: &AppState) -> Result<Arc<dyn CompletionService>, HandlerError> {
    state.completion.clone().ok_or_else(|| {
        error!("Completion request rejected: {}", MISSING_API_KEY);
        reject(StatusCode::INTERNAL_SERVER_ERROR, MISSING_API_KEY)
    })
}

//=========================================================================================
// Article Handlers
//=========================================================================================

/// List the signed-in user's articles, newest first.
#[utoipa::path(
    get,
    path = "/api/articles",
    responses(
        (status = 200, description = "The user's articles", body = [ArticleResponse]),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Failed to fetch articles", body = ErrorResponse)
    )
)]
pub async fn list_articles_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, HandlerError> {
    let articles = state
        .articles
        .list_articles_for_user(user.id)
        .await
        .map_err(|e| {
            error!("Failed to fetch articles for user {}: {:?}", user.id, e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch articles")
        })?;

    let body: Vec<ArticleResponse> = articles.into_iter().map(ArticleResponse::from).collect();
    Ok(Json(body))
}

/// Store an article and its summary for the signed-in user.
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Missing fields or bad body", body = ErrorResponse),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Failed to create article", body = ErrorResponse)
    )
)]
pub async fn create_article_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let req = json_body(payload)?;
    let new_article = NewArticle {
        title: req.title.unwrap_or_default(),
        content: req.content.unwrap_or_default(),
        summary: req.summary.unwrap_or_default(),
    };
    let missing = new_article.missing_fields();
    if !missing.is_empty() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            format!("Missing required fields: {}", missing.join(", ")),
        ));
    }

    let article = state
        .articles
        .create_article(user.id, &new_article)
        .await
        .map_err(|e| {
            error!("Failed to create article: {:?}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create article")
        })?;
    info!("Created article {} for user {}", article.id, user.id);

    Ok((StatusCode::CREATED, Json(ArticleResponse::from(article))))
}

//=========================================================================================
// Generation Handlers
//=========================================================================================

/// Summarize an article in two to three paragraphs.
#[utoipa::path(
    post,
    path = "/api/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "The generated summary", body = SummarizeResponse),
        (status = 400, description = "Missing content or bad body", body = ErrorResponse),
        (status = 500, description = "Missing API key or completion failure", body = ErrorResponse)
    )
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let completion = completion_service(&state)?;
    let req = json_body(payload)?;
    let content = required(req.content)
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Content is required"))?;

    let summary = generate_summary(completion.as_ref(), &content)
        .await
        .map_err(|e| {
            error!("Error summarizing content: {:?}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(SummarizeResponse { summary }))
}

/// Generate five multiple-choice questions about an article.
#[utoipa::path(
    post,
    path = "/api/quiz",
    request_body = QuizRequest,
    responses(
        (status = 200, description = "The generated questions", body = QuizResponse),
        (status = 400, description = "Missing title/content or bad body", body = ErrorResponse),
        (status = 500, description = "Missing key, AI failure or bad quiz", body = ErrorResponse)
    )
)]
pub async fn quiz_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let completion = completion_service(&state)?;
    let req = json_body(payload)?;
    let (Some(title), Some(content)) = (required(req.title), required(req.content)) else {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Title and content are required",
        ));
    };

    let questions = generate_quiz(completion.as_ref(), &title, &content)
        .await
        .map_err(|e| {
            error!("Error generating quiz: {:?}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(QuizResponse {
        questions: questions.into_iter().map(QuizQuestionBody::from).collect(),
    }))
}

pub async fn healthz() -> &'static str {
    "ok"
}
