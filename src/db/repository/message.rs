use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_message(conn: &Connection, msg: &ChatMessage) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO messages (id, conversation_id, sender, content, options, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            msg.id.to_string(),
            msg.conversation_id.to_string(),
            msg.sender.as_str(),
            msg.content,
            serde_json::to_string(&msg.options)?,
            format_timestamp(&msg.created_at),
        ],
    )?;
    Ok(())
}

/// Messages of one conversation in the order they were written.
pub fn get_messages_by_conversation(
    conn: &Connection,
    conversation_id: &Uuid,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, conversation_id, sender, content, options, created_at
         FROM messages WHERE conversation_id = ?1 ORDER BY created_at ASC, rowid ASC",
    )?;

    let rows = stmt.query_map(params![conversation_id.to_string()], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            sender: row.get(2)?,
            content: row.get(3)?,
            options: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

struct MessageRow {
    id: String,
    conversation_id: String,
    sender: String,
    content: String,
    options: String,
    created_at: String,
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, DatabaseError> {
    Ok(ChatMessage {
        id: parse_uuid(&row.id)?,
        conversation_id: parse_uuid(&row.conversation_id)?,
        sender: MessageSender::from_str(&row.sender)?,
        content: row.content,
        options: serde_json::from_str(&row.options)?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
