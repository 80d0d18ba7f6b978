use crate::{
    AppState,
    types::{AppError, ChatRequest, ChatResponse, ErrorResponse, Result},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};

/// Answer the chat widget from the FAQ table
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Canned reply", body = ChatResponse),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 413, description = "Body over the configured limit", body = ErrorResponse)
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Option<ChatRequest>>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    // A `null` body is an empty conversation
    let Json(request) = payload.map_err(AppError::from)?;
    let request = request.unwrap_or_default();

    let faq = state.config_manager.faq();
    let reply = faq.answer(&request.messages);

    tracing::debug!(
        turns = request.messages.len(),
        fallback = reply == faq.fallback(),
        "Answered chat message"
    );

    Ok(Json(ChatResponse {
        reply: reply.to_string(),
    }))
}
