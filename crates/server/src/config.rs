//! Server configuration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::assistant::Assistant;
use crate::auth::SessionGateway;
use crate::store::Store;

/// Minimum length for the session secret, matching the sealed-cookie
/// key derivation input requirement.
pub const MIN_SECRET_LEN: usize = 32;

/// Default session lifetime: seven days.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Session cookie policy: secret, cookie name, transport flag, lifetime.
///
/// Built once at startup and injected into the session codec and the
/// route guard. Never read from the environment inside request code,
/// so tests can construct their own.
#[derive(Clone)]
pub struct SessionConfig {
    secret: String,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub max_age: Duration,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl SessionConfig {
    pub fn new(
        secret: impl Into<String>,
        cookie_name: impl Into<String>,
        cookie_secure: bool,
    ) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            bail!("session secret must be at least {MIN_SECRET_LEN} characters");
        }
        Ok(Self {
            secret,
            cookie_name: cookie_name.into(),
            cookie_secure,
            max_age: DEFAULT_MAX_AGE,
        })
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub(crate) fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

/// Configuration for the MediAI server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// SQLite database path
    pub database_path: PathBuf,
    /// Model used by the chat relay
    pub model: String,
    /// Session cookie policy
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Build the configuration from the environment.
    ///
    /// `MEDIAI_SESSION_SECRET` is required; everything else has a
    /// default. The cookie is marked Secure unless `MEDIAI_ENV` is
    /// `development`.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("MEDIAI_SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("MEDIAI_SESSION_SECRET not set"))?;

        let cookie_secure = std::env::var("MEDIAI_ENV")
            .map(|env| env != "development")
            .unwrap_or(true);

        let session = SessionConfig::new(secret, "mediai_session", cookie_secure)?;

        Ok(Self {
            port: std::env::var("MEDIAI_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3001),
            database_path: std::env::var("MEDIAI_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("mediai.sqlite")),
            model: std::env::var("MEDIAI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            session,
        })
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionGateway>,
    pub store: Arc<Store>,
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub async fn new(config: &ServerConfig) -> Result<Self> {
        let store = Store::open(&config.database_path).await?;
        Ok(Self {
            sessions: Arc::new(SessionGateway::new(&config.session)),
            store: Arc::new(store),
            assistant: Arc::new(Assistant::new(&config.model)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_rejects_short_secret() {
        assert!(SessionConfig::new("too-short", "mediai_session", false).is_err());
    }

    #[test]
    fn session_config_accepts_long_secret() {
        let config =
            SessionConfig::new("0123456789abcdef0123456789abcdef", "mediai_session", true)
                .unwrap();
        assert_eq!(config.cookie_name, "mediai_session");
        assert!(config.cookie_secure);
        assert_eq!(config.max_age, Duration::from_secs(7 * 24 * 60 * 60));
    }
}
