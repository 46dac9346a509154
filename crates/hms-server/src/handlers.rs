use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use hms_auth::middleware::{AdminUser, CurrentUser, OptionalUser};
use hms_auth::{AuditAction, AuditRecord, AuthError, RecordOptions};
use serde_json::{Value, json};

use crate::server::AppState;

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The caller's resolved identity. Rejects anonymous callers with 401.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!(user))
}

/// Session check for UIs: always 200, `user` is null when anonymous.
pub async fn session(OptionalUser(user): OptionalUser) -> Json<Value> {
    Json(json!({
        "authenticated": user.is_some(),
        "user": user,
    }))
}

pub async fn admin_whoami(admin: AdminUser) -> Json<Value> {
    let user = admin.into_user();
    tracing::debug!(roles = user.roles().len(), "admin whoami");
    Json(json!(user))
}

/// Audits the sign-out and clears the session cookie.
///
/// The audit write follows the configured failure policy: under fail-closed
/// a failed write turns into a 500 and the cookie is kept.
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), AuthError> {
    let record = AuditRecord::new(AuditAction::Logout, "sessions")
        .with_user_id(user.id())
        .with_changes(json!({ "source": user.source() }));

    state
        .audit
        .record(record, RecordOptions::default().with_context("logout"))
        .await?;

    let cleared = Cookie::build((state.session_cookie.to_string(), "")).path("/");
    Ok((StatusCode::NO_CONTENT, jar.remove(cleared)))
}
