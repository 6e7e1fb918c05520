//! Auth handlers: register, login, logout, whoami.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::AppendHeaders,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{password, Ctx, Identity};
use crate::config::AppState;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public identity summary. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct IdentitySummary {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id().to_string(),
            email: identity.email().to_string(),
            name: identity.name().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: IdentitySummary,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    info!("POST /api/register - {}", req.email);

    if req.email.is_empty() || req.password.is_empty() {
        return Err(Error::BadRequest("Email and password required".to_string()));
    }
    if !req.email.contains('@') {
        return Err(Error::BadRequest("Invalid email".to_string()));
    }

    if state.store.find_user_by_email(&req.email).await?.is_some() {
        warn!("[Auth] Registration against existing email: {}", req.email);
        return Err(Error::DuplicateAccount);
    }

    let password_hash = password::hash(&req.password)?;
    let user = state
        .store
        .create_user(&req.email, req.name.as_deref(), &password_hash)
        .await?;

    info!("[Auth] User registered: {}", user.email);

    let identity = Identity::new(user.id, user.email, user.name);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created".to_string(),
            user: IdentitySummary::from(&identity),
        }),
    ))
}

/// POST /api/login
///
/// Unknown email and wrong password both answer the same generic 401;
/// the ambiguity is a security property, not missing information.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<AuthResponse>)> {
    info!("POST /api/login - {}", req.email);

    if req.email.is_empty() || req.password.is_empty() {
        return Err(Error::BadRequest("Email and password required".to_string()));
    }

    let Some(user) = state.store.find_user_by_email(&req.email).await? else {
        warn!("[Auth] Failed login attempt for {}", req.email);
        return Err(Error::InvalidCredentials);
    };

    if !password::verify(&req.password, &user.password_hash) {
        warn!("[Auth] Failed login attempt for {}", req.email);
        return Err(Error::InvalidCredentials);
    }

    let identity = Identity::new(user.id, user.email, user.name);
    let cookie = state.sessions.issue(&identity);

    info!("[Auth] User logged in: {}", identity.email());

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user: IdentitySummary::from(&identity),
        }),
    ))
}

/// POST /api/logout
///
/// Always succeeds; clearing an already-absent session is a no-op.
pub async fn logout(
    State(state): State<AppState>,
) -> (AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<serde_json::Value>) {
    info!("POST /api/logout");
    (
        AppendHeaders([(SET_COOKIE, state.sessions.destroy())]),
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: IdentitySummary,
}

/// GET /api/me
pub async fn me(ctx: Ctx) -> Json<MeResponse> {
    Json(MeResponse {
        user: IdentitySummary::from(ctx.identity()),
    })
}
