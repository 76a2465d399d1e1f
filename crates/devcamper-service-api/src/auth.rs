//! Account registration.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use devcamper_lib::{Document, Fields};
use devcamper_service_shared::{AppState, Envelope, ErrorReport};
use serde_json::Value;

/// Role given to accounts that do not ask for one.
pub const DEFAULT_ROLE: &str = "user";

/// `POST /api/v1/auth/register`
///
/// Validates and stores the account through the users controller. The
/// response carries the stored profile; the password never leaves the store.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Fields>, JsonRejection>,
) -> Result<Envelope<Document>, ErrorReport> {
    let Json(mut fields) = body?;
    fields
        .entry("role")
        .or_insert_with(|| Value::String(DEFAULT_ROLE.to_string()));

    let user = state.users().create(fields).await?;
    tracing::info!(id = %user.id, "user registered");
    Ok(Envelope::ok(user))
}
