pub mod middleware;
pub mod rest;
pub mod state;
pub mod webhook;


use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use middleware::require_auth;
pub use rest::{
    create_article_handler, list_articles_handler, quiz_handler, summarize_handler, ApiDoc,
};
pub use state::AppState;
pub use webhook::clerk_webhook_handler;

/// Builds the complete application router: public routes, protected routes and docs.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/healthz", get(rest::healthz))
        .route("/api/summarize", post(summarize_handler))
        .route("/api/quiz", post(quiz_handler))
        .route("/api/webhook/clerk", post(clerk_webhook_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/api/articles",
            get(list_articles_handler).post(create_article_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
