//! Route-level access gating.
//!
//! Every inbound path is classified as public, anonymous-only, or
//! protected, and gated on whether a session cookie is attached. This
//! edge check is presence-only by design: full cryptographic
//! verification happens in the handler via [`Ctx`], so a
//! malformed-but-present cookie passes the gate here and is rejected
//! there. The split avoids paying for AEAD verification twice on
//! every request.
//!
//! [`Ctx`]: super::Ctx

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::config::AppState;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Served regardless of session state.
    Public,
    /// Login and registration surfaces; a logged-in caller is sent to
    /// the authenticated home instead.
    AnonymousOnly,
    /// Requires a session; anonymous callers are sent to login.
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectLogin,
    RedirectHome,
}

pub fn classify(path: &str) -> RouteClass {
    if path == "/main"
        || path.starts_with("/main/")
        || path == "/api/me"
        || path == "/api/chat"
        || path == "/api/medical-records"
    {
        RouteClass::Protected
    } else if path == "/" || path == "/login" || path == "/register" {
        RouteClass::AnonymousOnly
    } else {
        RouteClass::Public
    }
}

/// Pure transition of (route class, cookie presence) into an access
/// decision. No side effects beyond the redirect choice itself.
pub fn decide(class: RouteClass, cookie_present: bool) -> Decision {
    match (class, cookie_present) {
        (RouteClass::Protected, false) => Decision::RedirectLogin,
        (RouteClass::AnonymousOnly, true) => Decision::RedirectHome,
        _ => Decision::Allow,
    }
}

pub async fn guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let class = classify(&path);
    let present = state.sessions.cookie_present(req.headers());
    let decision = decide(class, present);
    debug!("MIDDLEWARE: route_guard {path} {class:?} -> {decision:?}");

    match decision {
        Decision::Allow => next.run(req).await,
        // API routes are fetched, not navigated; answer 401 instead
        // of a redirect the client cannot follow meaningfully.
        Decision::RedirectLogin if path.starts_with("/api/") => {
            Error::AuthRequired.into_response()
        }
        Decision::RedirectLogin => Redirect::temporary("/login").into_response(),
        Decision::RedirectHome => Redirect::temporary("/main").into_response(),
    }
}
