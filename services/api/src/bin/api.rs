//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, JwtIdentityVerifier, OpenAiCompletionAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use article_quiz_core::ports::{CompletionService, IdentityVerifier};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let completion: Option<Arc<dyn CompletionService>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(OpenAiCompletionAdapter::from_key(
            key,
            &config.completion_api_base,
            config.completion_model.clone(),
        ))),
        None => {
            warn!("GEMINI_API_KEY is not set; /api/summarize and /api/quiz will fail");
            None
        }
    };

    let identity: Option<Arc<dyn IdentityVerifier>> = match &config.jwt_public_key {
        Some(pem) => Some(Arc::new(JwtIdentityVerifier::from_rsa_pem(pem).map_err(
            |e| ApiError::Internal(format!("Invalid CLERK_JWT_PUBLIC_KEY: {}", e)),
        )?)),
        None => {
            warn!("CLERK_JWT_PUBLIC_KEY is not set; /api/articles will reject every request");
            None
        }
    };

    if config.webhook_secret.is_none() {
        warn!("CLERK_WEBHOOK_SECRET is not set; webhook deliveries will fail");
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        articles: db_adapter.clone(),
        users: db_adapter,
        completion,
        identity,
        webhook_secret: config.webhook_secret.clone(),
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = build_router(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
