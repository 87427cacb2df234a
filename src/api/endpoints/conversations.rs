//! Consultation endpoints.
//!
//! - `POST /api/conversations`: start a consultation
//! - `GET /api/conversations`: list consultations, newest first
//! - `GET /api/conversations/:id/messages`: full message history
//! - `POST /api/conversations/:id/messages`: one triage turn
//! - `GET /api/conversations/:id/summary`: plain-text consultation report
//! - `DELETE /api/conversations/:id`: delete with its messages

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::chat::{self, ChatTurn, StartedConversation};
use crate::models::{ChatMessage, ConversationSummary};

fn parse_conversation_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid conversation ID: {e}")))
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub patient_name: String,
}

/// `POST /api/conversations`
pub async fn start(
    State(ctx): State<ApiContext>,
    Json(req): Json<StartRequest>,
) -> Result<(StatusCode, Json<StartedConversation>), ApiError> {
    let mut conn = ctx.db()?;
    let started = chat::start_conversation(&mut conn, &req.patient_name)?;
    Ok((StatusCode::CREATED, Json(started)))
}

#[derive(Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationSummary>,
}

/// `GET /api/conversations`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<ConversationsResponse>, ApiError> {
    let conn = ctx.db()?;
    let conversations = chat::list_conversations(&conn)?;
    Ok(Json(ConversationsResponse { conversations }))
}

#[derive(Serialize)]
pub struct MessagesResponse {
    pub conversation_id: Uuid,
    pub messages: Vec<ChatMessage>,
}

/// `GET /api/conversations/:id/messages`
pub async fn messages(
    State(ctx): State<ApiContext>,
    Path(conversation_id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let id = parse_conversation_id(&conversation_id)?;
    let conn = ctx.db()?;
    let messages = chat::history(&conn, &id)?;
    Ok(Json(MessagesResponse {
        conversation_id: id,
        messages,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub message: String,
}

/// `POST /api/conversations/:id/messages`
pub async fn send(
    State(ctx): State<ApiContext>,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendRequest>,
) -> Result<Json<ChatTurn>, ApiError> {
    let id = parse_conversation_id(&conversation_id)?;
    let mut conn = ctx.db()?;
    let turn = chat::send_message(&mut conn, &ctx.engine, &id, &req.message)?;
    Ok(Json(turn))
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub conversation_id: Uuid,
    pub report: String,
}

/// `GET /api/conversations/:id/summary`
pub async fn summary(
    State(ctx): State<ApiContext>,
    Path(conversation_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let id = parse_conversation_id(&conversation_id)?;
    let conn = ctx.db()?;
    let report = chat::consultation_summary(&conn, &id)?;
    Ok(Json(SummaryResponse {
        conversation_id: id,
        report,
    }))
}

/// `DELETE /api/conversations/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(conversation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_conversation_id(&conversation_id)?;
    let conn = ctx.db()?;
    chat::delete_conversation(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
