//! AI chat relay.
//!
//! Forwards a single user message to the configured model and returns
//! the reply text. Identity resolution happens first; the relay never
//! sees an unauthenticated request past the [`Ctx`] extractor.

use axum::{extract::State, Json};
use genai::chat::{ChatMessage, ChatRequest};
use genai::Client as GenAiClient;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::Ctx;
use crate::config::AppState;
use crate::error::{Error, Result};

const SYSTEM_PROMPT: &str = "You are MediAI, a careful clinical assistant. \
Answer health questions clearly, flag emergencies, and remind users you \
are not a substitute for a doctor.";

pub struct Assistant {
    client: GenAiClient,
    model: String,
}

impl Assistant {
    pub fn new(model: &str) -> Self {
        Self {
            client: GenAiClient::default(),
            model: model.to_string(),
        }
    }

    pub async fn reply(&self, message: &str) -> Result<String> {
        let chat_req = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(message),
        ]);

        let response = self
            .client
            .exec_chat(&self.model, chat_req, None)
            .await
            .map_err(|e| {
                warn!("[Assistant] Upstream call failed: {e}");
                Error::Upstream(e.to_string())
            })?;

        Ok(response
            .first_text()
            .unwrap_or("Sorry, I couldn't generate a response.")
            .to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: Option<String>,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<ChatRequestBody>,
) -> Result<Json<String>> {
    let Some(message) = req.message.filter(|m| !m.trim().is_empty()) else {
        return Err(Error::BadRequest("Invalid message".to_string()));
    };

    info!("[Assistant] Chat request from {}", ctx.user_id());

    let reply = state.assistant.reply(&message).await?;
    Ok(Json(reply))
}
