//! Chat service: consultations on top of the triage engine.
//!
//! Owns the conversation lifecycle (start, send, history, list, delete,
//! summary) and the persistence discipline around engine turns. The engine
//! itself stays stateless; this module loads the symptom set and state,
//! runs one turn, and writes the outcome back in a single transaction.

use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::MAX_MESSAGE_CHARS;
use crate::db::{self, DatabaseError};
use crate::models::*;
use crate::pipeline::{Reply, TriageEngine, TurnInput};

pub const REPORT_DISCLAIMER: &str = "Disclaimer: AI-generated report. Consult a doctor.";

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Uuid),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message exceeds {max} characters ({actual})")]
    MessageTooLong { max: usize, actual: usize },
}

impl From<rusqlite::Error> for ChatError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(e))
    }
}

// ═══════════════════════════════════════════
// Service types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedConversation {
    pub conversation: Conversation,
    pub greeting: ChatMessage,
}

/// Outcome of one user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub conversation_id: Uuid,
    pub reply: Reply,
    pub bot_message: ChatMessage,
    pub symptoms: SymptomSet,
    pub state: ConversationState,
    /// Present once the consultation has a diagnosis.
    pub title: Option<String>,
}

// ═══════════════════════════════════════════
// Greeting
// ═══════════════════════════════════════════

fn greeting_for(patient_name: &str) -> String {
    let name = match patient_name.trim() {
        "" => "there",
        trimmed => trimmed,
    };
    let templates: [fn(&str) -> String; 2] = [
        |n| format!("Hello {n}, I'm Dr. Bot. How can I help you today?"),
        |n| format!("Hi {n}. What symptoms are bothering you?"),
    ];
    let pick = templates
        .choose(&mut rand::thread_rng())
        .unwrap_or(&templates[0]);
    pick(name)
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// ═══════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════

/// Open a consultation in state `started` with a bot greeting.
pub fn start_conversation(
    conn: &mut Connection,
    patient_name: &str,
) -> Result<StartedConversation, ChatError> {
    let created_at = now();
    let conversation = Conversation {
        id: Uuid::new_v4(),
        patient_name: patient_name.trim().to_string(),
        title: None,
        status: ConversationState::Started,
        symptoms: SymptomSet::new(),
        created_at,
    };
    let greeting = ChatMessage {
        id: Uuid::new_v4(),
        conversation_id: conversation.id,
        sender: MessageSender::Bot,
        content: greeting_for(patient_name),
        options: Vec::new(),
        created_at,
    };

    let tx = conn.transaction()?;
    db::insert_conversation(&tx, &conversation)?;
    db::insert_message(&tx, &greeting)?;
    tx.commit()?;

    tracing::info!(conversation_id = %conversation.id, "Consultation started");
    Ok(StartedConversation {
        conversation,
        greeting,
    })
}

/// Run one triage turn for a user message and persist it.
///
/// The whole read-run-write sequence holds an IMMEDIATE transaction, so two
/// messages for the same consultation cannot interleave. A fallback reply
/// stores both messages but leaves symptoms, state and title untouched.
pub fn send_message(
    conn: &mut Connection,
    engine: &TriageEngine,
    conversation_id: &Uuid,
    text: &str,
) -> Result<ChatTurn, ChatError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    let length = text.chars().count();
    if length > MAX_MESSAGE_CHARS {
        return Err(ChatError::MessageTooLong {
            max: MAX_MESSAGE_CHARS,
            actual: length,
        });
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let conversation = db::get_conversation(&tx, conversation_id)?
        .ok_or(ChatError::ConversationNotFound(*conversation_id))?;

    db::insert_message(
        &tx,
        &ChatMessage {
            id: Uuid::new_v4(),
            conversation_id: *conversation_id,
            sender: MessageSender::User,
            content: text.to_string(),
            options: Vec::new(),
            created_at: now(),
        },
    )?;

    let result = engine.process_turn(&TurnInput {
        text: text.to_string(),
        symptoms: conversation.symptoms,
        state: conversation.status,
        title: conversation.title,
    });

    let bot_message = ChatMessage {
        id: Uuid::new_v4(),
        conversation_id: *conversation_id,
        sender: MessageSender::Bot,
        content: result.reply.display_text(),
        options: result.reply.options().to_vec(),
        created_at: now(),
    };
    db::insert_message(&tx, &bot_message)?;

    if !result.is_fallback() {
        db::update_conversation_progress(
            &tx,
            conversation_id,
            &result.symptoms,
            result.state,
            result.title.as_deref(),
        )?;
    }

    tx.commit()?;

    Ok(ChatTurn {
        conversation_id: *conversation_id,
        reply: result.reply,
        bot_message,
        symptoms: result.symptoms,
        state: result.state,
        title: result.title,
    })
}

/// All messages of a consultation, oldest first.
pub fn history(conn: &Connection, conversation_id: &Uuid) -> Result<Vec<ChatMessage>, ChatError> {
    require_conversation(conn, conversation_id)?;
    Ok(db::get_messages_by_conversation(conn, conversation_id)?)
}

pub fn list_conversations(conn: &Connection) -> Result<Vec<ConversationSummary>, ChatError> {
    Ok(db::list_conversation_summaries(conn)?)
}

pub fn delete_conversation(conn: &Connection, conversation_id: &Uuid) -> Result<(), ChatError> {
    match db::delete_conversation(conn, conversation_id) {
        Ok(()) => {
            tracing::info!(conversation_id = %conversation_id, "Consultation deleted");
            Ok(())
        }
        Err(DatabaseError::NotFound { .. }) => {
            Err(ChatError::ConversationNotFound(*conversation_id))
        }
        Err(e) => Err(e.into()),
    }
}

/// Plain-text consultation report.
pub fn consultation_summary(conn: &Connection, conversation_id: &Uuid) -> Result<String, ChatError> {
    let conversation = require_conversation(conn, conversation_id)?;

    let symptoms: Vec<String> = conversation
        .symptoms
        .iter()
        .map(|s| s.display_label())
        .collect();
    let symptom_line = if symptoms.is_empty() {
        "No specific symptoms recorded.".to_string()
    } else {
        symptoms.join(", ")
    };
    let patient = if conversation.patient_name.is_empty() {
        "Anonymous"
    } else {
        conversation.patient_name.as_str()
    };

    Ok(format!(
        "Consultation Report\n\
         \n\
         Patient: {patient}\n\
         Date: {date}\n\
         \n\
         Diagnosis Result:\n\
         {title}\n\
         \n\
         Reported Symptoms:\n\
         {symptom_line}\n\
         \n\
         {REPORT_DISCLAIMER}\n",
        date = conversation.created_at.format("%Y-%m-%d %H:%M:%S"),
        title = conversation.display_title(),
    ))
}

fn require_conversation(conn: &Connection, id: &Uuid) -> Result<Conversation, ChatError> {
    db::get_conversation(conn, id)?.ok_or(ChatError::ConversationNotFound(*id))
}
