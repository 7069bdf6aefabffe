//! services/api/src/web/webhook.rs
//!
//! The identity provider's user-lifecycle webhook. Deliveries are signed by svix
//! and checked with the `svix` crate against the configured secret.

use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use svix::webhooks::Webhook;
use tracing::{error, info, warn};

const SVIX_HEADERS: [&str; 3] = ["svix-id", "svix-timestamp", "svix-signature"];

//=========================================================================================
// Event Payloads
//=========================================================================================

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: UserEventData,
}

#[derive(Debug, Deserialize)]
struct UserEventData {
    id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    email_address: String,
}

impl UserEventData {
    fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.as_str())
            .filter(|e| !e.is_empty())
    }

    fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

//=========================================================================================
// Handler
//=========================================================================================

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Receive user lifecycle events from the identity provider.
#[utoipa::path(
    post,
    path = "/api/webhook/clerk",
    request_body(content_type = "application/json", description = "Provider event envelope"),
    responses(
        (status = 200, description = "Webhook processed"),
        (status = 400, description = "Missing headers, bad signature or no email"),
        (status = 500, description = "Secret not configured or user sync failed")
    ),
    params(
        ("svix-id" = String, Header, description = "Message id"),
        ("svix-timestamp" = String, Header, description = "Unix timestamp of the delivery"),
        ("svix-signature" = String, Header, description = "Space-separated v1 signatures")
    )
)]
pub async fn clerk_webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let secret = state.webhook_secret.as_deref().ok_or_else(|| {
        error!("Webhook received but CLERK_WEBHOOK_SECRET is not set");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error: Webhook secret is not configured".to_string(),
        )
    })?;

    if SVIX_HEADERS.iter().any(|name| header(&headers, name).is_none()) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Error: Missing svix headers".to_string(),
        ));
    }

    let webhook = Webhook::new(secret).map_err(|e| {
        error!("CLERK_WEBHOOK_SECRET is not a valid svix secret: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error: Invalid webhook secret".to_string(),
        )
    })?;
    webhook.verify(&body, &headers).map_err(|e| {
        warn!("Error verifying webhook: {:?}", e);
        (
            StatusCode::BAD_REQUEST,
            "Error: Verification failed".to_string(),
        )
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        warn!("Malformed webhook payload: {}", e);
        (StatusCode::BAD_REQUEST, "Error: Invalid payload".to_string())
    })?;

    match event.event_type.as_str() {
        "user.created" | "user.updated" => {
            let data = &event.data;
            let (Some(external_id), Some(email)) = (data.id.as_deref(), data.primary_email())
            else {
                return Err((
                    StatusCode::BAD_REQUEST,
                    "Error: No email found".to_string(),
                ));
            };
            let name = data.display_name();
            state
                .users
                .sync_user(external_id, email, name.as_deref())
                .await
                .map_err(|e| {
                    error!("Error syncing user: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error: Failed to sync user".to_string(),
                    )
                })?;
            info!("User {} ({}): {}", external_id, event.event_type, email);
        }
        "user.deleted" => {
            if let Some(external_id) = event.data.id.as_deref() {
                state
                    .users
                    .delete_user_by_external_id(external_id)
                    .await
                    .map_err(|e| {
                        error!("Error deleting user: {:?}", e);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Error: Failed to delete user".to_string(),
                        )
                    })?;
                info!("User deleted: {}", external_id);
            }
        }
        other => info!("Ignoring webhook event of type {}", other),
    }

    Ok((StatusCode::OK, "Webhook processed successfully"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TEST_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

    /// Produces a `svix-signature` header value for the payload.
    pub(crate) fn sign(secret: &str, msg_id: &str, timestamp: i64, body: &[u8]) -> String {
        Webhook::new(secret)
            .unwrap()
            .sign(msg_id, timestamp, body)
            .unwrap()
    }

    #[test]
    fn display_name_joins_present_parts() {
        let data: UserEventData = serde_json::from_str(
            r#"{"id":"user_1","email_addresses":[],"first_name":"Ada","last_name":null}"#,
        )
        .unwrap();
        assert_eq!(data.display_name().as_deref(), Some("Ada"));
        assert_eq!(data.primary_email(), None);
    }

    #[test]
    fn primary_email_is_the_first_address() {
        let data: UserEventData = serde_json::from_value(serde_json::json!({
            "id": "user_1",
            "email_addresses": [{ "email_address": "a@x.dev" }, { "email_address": "b@x.dev" }]
        }))
        .unwrap();
        assert_eq!(data.primary_email(), Some("a@x.dev"));
        assert_eq!(data.display_name(), None);
    }
}
