//! Authentication Module
//!
//! Credential verification, sealed session cookies, and route-level
//! access gating. Sessions live entirely in a signed client-held
//! token; there is no server-side session table.

pub mod ctx;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod session;

pub use ctx::Ctx;
pub use gateway::SessionGateway;

use serde::{Deserialize, Serialize};

/// The authenticated principal embedded in a session.
///
/// Constructed only inside this module, at login, and never mutated
/// after issuance; a changed profile requires a fresh login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    id: String,
    email: String,
    name: Option<String>,
}

impl Identity {
    pub(crate) fn new(id: String, email: String, name: Option<String>) -> Self {
        Self { id, email, name }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
