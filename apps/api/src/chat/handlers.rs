//! Axum route handler for the chat assistant.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::prompts::system_prompt;
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::Json;
use crate::llm_client::{LlmError, Turn, MODEL};
use crate::state::AppState;

pub const MAX_MESSAGE_CHARS: usize = 4000;
pub const MAX_HISTORY_TURNS: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: &'static str,
}

impl ChatRequest {
    /// Validates the request and flattens it into the turn list sent upstream.
    fn into_turns(self) -> Result<Vec<Turn>, AppError> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("message cannot be empty".to_string()));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::Validation(format!(
                "message cannot exceed {MAX_MESSAGE_CHARS} characters"
            )));
        }
        if self.history.len() > MAX_HISTORY_TURNS {
            return Err(AppError::Validation(format!(
                "history cannot exceed {MAX_HISTORY_TURNS} turns"
            )));
        }
        if self
            .history
            .iter()
            .any(|turn| turn.content.chars().count() > MAX_MESSAGE_CHARS)
        {
            return Err(AppError::Validation(format!(
                "history turns cannot exceed {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let mut turns = self.history;
        turns.push(Turn::user(message));
        Ok(turns)
    }
}

/// POST /api/v1/chat
///
/// Forwards the conversation to the hosted LLM with a system prompt tailored
/// to the caller's role.
pub async fn handle_chat(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let principal = *requester.require()?;
    let turns = request.into_turns()?;

    let response = state
        .llm
        .converse(&system_prompt(principal.role), &turns)
        .await?;
    let reply = response
        .text()
        .ok_or(LlmError::EmptyContent)?
        .trim()
        .to_string();

    info!(
        requester = %principal.id,
        turns = turns.len(),
        "chat reply generated"
    );
    Ok(Json(ChatResponse {
        reply,
        model: MODEL,
    }))
}
