use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::markdown::render_markdown;
use crate::models::{ChatRequest, ChatResponse, ErrorBody};
use crate::state::AppState;

const MAX_CHAT_MESSAGE_LEN: usize = 2000;

/// Chat-template control tokens stripped from user input.
const CONTROL_TOKENS: &[&str] = &[
    "<|im_start|>",
    "<|im_end|>",
    "<|begin_of_text|>",
    "<|start_header_id|>",
    "<|end_header_id|>",
    "<|eot_id|>",
    "<|endoftext|>",
];

/// POST /api/chat: answer a question from the indexed papers.
pub async fn chat(
    State(state): State<AppState>,
    req: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorBody>)> {
    let message = match req {
        Ok(Json(req)) => req.message.unwrap_or_default(),
        Err(rejection) => {
            tracing::warn!("Unreadable chat request: {}", rejection.body_text());
            String::new()
        }
    };

    let message = clean_message(&message);
    if message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("No message provided")),
        ));
    }

    if !state.rag.is_ready() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody::with_details(
                "Knowledge base is not ready",
                "The document index is still being built. Try again shortly.",
            )),
        ));
    }

    let answer = state.rag.query(&message).await.map_err(|e| {
        tracing::error!("Chat query failed: {e:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::with_details(
                "Failed to process message",
                format!("{e:#}"),
            )),
        )
    })?;

    Ok(Json(ChatResponse {
        html: render_markdown(&answer),
        response: answer,
        success: true,
    }))
}

/// Strip control tokens, cap the length and trim. Empty means nothing to ask.
fn clean_message(raw: &str) -> String {
    let sanitized = sanitize_for_prompt(raw);
    truncate_to_char_boundary(sanitized.trim(), MAX_CHAT_MESSAGE_LEN)
        .trim()
        .to_string()
}

/// Keep at most `max_chars` characters.
fn truncate_to_char_boundary(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn sanitize_for_prompt(s: &str) -> String {
    CONTROL_TOKENS
        .iter()
        .fold(s.to_string(), |acc, token| acc.replace(token, ""))
}
