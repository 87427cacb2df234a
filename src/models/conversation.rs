use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ConversationState, MessageSender};
use super::symptom::SymptomSet;

/// Title shown for a consultation that has not reached a diagnosis yet.
pub const UNTITLED_CONSULTATION: &str = "New Consultation";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub patient_name: String,
    /// Frozen to the first diagnosis reached; `None` before that.
    pub title: Option<String>,
    pub status: ConversationState,
    pub symptoms: SymptomSet,
    pub created_at: NaiveDateTime,
}

impl Conversation {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED_CONSULTATION)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: MessageSender,
    pub content: String,
    /// Answer buttons attached to a clarifying question.
    pub options: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// Row of the consultation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub status: ConversationState,
    pub created_at: NaiveDateTime,
    pub message_count: u32,
    pub last_message_at: Option<NaiveDateTime>,
    pub last_message_preview: String,
}
