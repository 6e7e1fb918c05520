//! Authenticated request context.
//!
//! The handler-side half of the two-tier access design: the route
//! guard only checked that a cookie was attached, so extracting a
//! [`Ctx`] performs the full cryptographic verification and rejects
//! with 401 when the token is absent, tampered, or expired.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::Identity;
use crate::config::AppState;
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct Ctx {
    identity: Identity,
}

impl Ctx {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> &str {
        self.identity.id()
    }
}

impl FromRequestParts<AppState> for Ctx {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        state
            .sessions
            .current(&parts.headers)
            .map(|identity| Ctx { identity })
            .ok_or(Error::AuthRequired)
    }
}
