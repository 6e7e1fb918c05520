use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum Error {
    // Auth errors
    /// Wrong email or wrong password. Deliberately never says which.
    InvalidCredentials,
    /// Registration against an email that already has an account.
    DuplicateAccount,
    /// No valid session on a route that needs one.
    AuthRequired,

    // Collaborator errors
    /// Credential or record store unreachable. Never treated as
    /// unauthenticated.
    StoreUnavailable,
    /// AI relay upstream failure.
    Upstream(String),

    // Generic
    BadRequest(String),
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Error::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            Error::DuplicateAccount => (StatusCode::CONFLICT, "User already exists".to_string()),
            Error::AuthRequired => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Error::StoreUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            ),
            Error::Upstream(msg) => {
                // The caller only sees the generic message; the
                // detail goes to the logs.
                error!("[Upstream] {msg}");
                (StatusCode::BAD_GATEWAY, "AI service error".to_string())
            }
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Internal(msg) => {
                error!("[Internal] {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": error_message
            }
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

// Store connectivity failures surface as a 5xx, distinct from any
// authentication outcome.
impl From<sqlx::Error> for Error {
    fn from(_err: sqlx::Error) -> Self {
        Error::StoreUnavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn internal_detail_stays_out_of_the_response() {
        let res = Error::Internal("db exploded".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(res).await;
        assert!(body.contains("Server error"));
        assert!(!body.contains("db exploded"));
    }

    #[tokio::test]
    async fn upstream_detail_stays_out_of_the_response() {
        let res = Error::Upstream("model quota exceeded".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        let body = body_text(res).await;
        assert!(body.contains("AI service error"));
        assert!(!body.contains("quota"));
    }
}
