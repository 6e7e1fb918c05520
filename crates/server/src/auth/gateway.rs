//! Request-time session API.
//!
//! Issue, read, and destroy sessions carried in a single HTTP cookie.
//! State lives entirely in the sealed token, so "destroy" just emits
//! a cookie-clearing header; there is nothing server-side to delete.

use axum::http::{header::COOKIE, HeaderMap};
use tracing::warn;

use super::session::SessionCodec;
use super::Identity;
use crate::config::SessionConfig;

pub struct SessionGateway {
    codec: SessionCodec,
    cookie_name: String,
    cookie_secure: bool,
    max_age_secs: u64,
}

impl SessionGateway {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            codec: SessionCodec::new(config),
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
            max_age_secs: config.max_age.as_secs(),
        }
    }

    /// Seal an identity and return the `Set-Cookie` value carrying it.
    pub fn issue(&self, identity: &Identity) -> String {
        let token = self.codec.encode(identity);
        self.cookie(&token, self.max_age_secs)
    }

    /// Resolve the caller's identity from the request headers.
    ///
    /// A missing cookie is a normal anonymous request. A cookie that
    /// fails verification also reads as anonymous, but is logged: a
    /// high rate of rejected tokens points at secret misconfiguration
    /// or tampering, which genuine absence never does.
    pub fn current(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = self.token(headers)?;
        match self.codec.decode(&token) {
            Ok(identity) => Some(identity),
            Err(err) => {
                warn!("[Auth] Rejected session cookie: {err}");
                None
            }
        }
    }

    /// `Set-Cookie` value that overwrites the client's token with an
    /// empty, already-expired one. Safe to send when no session
    /// exists; destroying nothing is a no-op success.
    pub fn destroy(&self) -> String {
        self.cookie("", 0)
    }

    /// Presence-only fast path for the route guard: is a session
    /// cookie attached at all? No cryptographic validation happens
    /// here; handlers that need the identity still call [`current`].
    ///
    /// [`current`]: Self::current
    pub fn cookie_present(&self, headers: &HeaderMap) -> bool {
        self.token(headers).is_some()
    }

    fn cookie(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
            self.cookie_name
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn token(&self, headers: &HeaderMap) -> Option<String> {
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            for pair in raw.split(';') {
                if let Some((name, value)) = pair.trim().split_once('=') {
                    if name == self.cookie_name && !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn gateway() -> SessionGateway {
        let config =
            SessionConfig::new("0123456789abcdef0123456789abcdef", "mediai_session", false)
                .unwrap();
        SessionGateway::new(&config)
    }

    fn headers_with_cookie(set_cookie: &str) -> HeaderMap {
        // Re-present the Set-Cookie pair the way a client would.
        let pair = set_cookie.split(';').next().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(pair).unwrap());
        headers
    }

    #[test]
    fn issue_then_current_roundtrips() {
        let gateway = gateway();
        let identity = Identity::new("u1".into(), "a@b.com".into(), None);
        let set_cookie = gateway.issue(&identity);
        assert!(set_cookie.starts_with("mediai_session="));
        assert!(set_cookie.contains("HttpOnly"));

        let headers = headers_with_cookie(&set_cookie);
        assert_eq!(gateway.current(&headers), Some(identity));
        assert!(gateway.cookie_present(&headers));
    }

    #[test]
    fn absent_cookie_is_absent() {
        let gateway = gateway();
        let headers = HeaderMap::new();
        assert_eq!(gateway.current(&headers), None);
        assert!(!gateway.cookie_present(&headers));
    }

    #[test]
    fn tampered_cookie_is_absent_for_callers() {
        let gateway = gateway();
        let identity = Identity::new("u1".into(), "a@b.com".into(), None);
        let set_cookie = gateway.issue(&identity);
        let mangled = set_cookie.replace("mediai_session=", "mediai_session=x");
        let headers = headers_with_cookie(&mangled);
        // Present at the edge, absent once verified.
        assert!(gateway.cookie_present(&headers));
        assert_eq!(gateway.current(&headers), None);
    }

    #[test]
    fn destroy_clears_and_is_idempotent() {
        let gateway = gateway();
        assert_eq!(gateway.destroy(), gateway.destroy());
        assert!(gateway.destroy().contains("Max-Age=0"));
        // The clearing cookie's empty value reads as no session.
        let headers = headers_with_cookie(&gateway.destroy());
        assert!(!gateway.cookie_present(&headers));
    }

    #[test]
    fn secure_flag_follows_config() {
        let config =
            SessionConfig::new("0123456789abcdef0123456789abcdef", "mediai_session", true)
                .unwrap();
        let gateway = SessionGateway::new(&config);
        let identity = Identity::new("u1".into(), "a@b.com".into(), None);
        assert!(gateway.issue(&identity).contains("; Secure"));
    }
}
