use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_conversation(conn: &Connection, conv: &Conversation) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO conversations (id, patient_name, title, status, collected_symptoms, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            conv.id.to_string(),
            conv.patient_name,
            conv.title,
            conv.status.as_str(),
            serde_json::to_string(&conv.symptoms)?,
            format_timestamp(&conv.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_conversation(conn: &Connection, id: &Uuid) -> Result<Option<Conversation>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_name, title, status, collected_symptoms, created_at
             FROM conversations WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok(ConversationRow {
                    id: row.get(0)?,
                    patient_name: row.get(1)?,
                    title: row.get(2)?,
                    status: row.get(3)?,
                    symptoms: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        )
        .optional()?;

    row.map(conversation_from_row).transpose()
}

/// Persist the outcome of one triage turn.
pub fn update_conversation_progress(
    conn: &Connection,
    id: &Uuid,
    symptoms: &SymptomSet,
    status: ConversationState,
    title: Option<&str>,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE conversations
         SET collected_symptoms = ?2, status = ?3, title = COALESCE(title, ?4)
         WHERE id = ?1",
        params![
            id.to_string(),
            serde_json::to_string(symptoms)?,
            status.as_str(),
            title,
        ],
    )?;

    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "conversation".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// All consultations, newest first, with message counts.
pub fn list_conversation_summaries(
    conn: &Connection,
) -> Result<Vec<ConversationSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.title, c.status, c.created_at,
                COUNT(m.id), MAX(m.created_at),
                COALESCE(
                    (SELECT SUBSTR(m2.content, 1, 80) FROM messages m2
                     WHERE m2.conversation_id = c.id
                     ORDER BY m2.created_at DESC, m2.rowid DESC LIMIT 1),
                    ''
                )
         FROM conversations c
         LEFT JOIN messages m ON m.conversation_id = c.id
         GROUP BY c.id
         ORDER BY c.created_at DESC, c.rowid DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, u32>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (id, title, status, created_at, message_count, last_message_at, preview) = row?;
        summaries.push(ConversationSummary {
            id: parse_uuid(&id)?,
            title: title.unwrap_or_else(|| UNTITLED_CONSULTATION.to_string()),
            status: ConversationState::from_str(&status)?,
            created_at: parse_timestamp(&created_at)?,
            message_count,
            last_message_at: last_message_at.as_deref().map(parse_timestamp).transpose()?,
            last_message_preview: preview,
        });
    }
    Ok(summaries)
}

/// Delete a consultation; its messages go with it.
pub fn delete_conversation(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM conversations WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "conversation".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct ConversationRow {
    id: String,
    patient_name: String,
    title: Option<String>,
    status: String,
    symptoms: String,
    created_at: String,
}

fn conversation_from_row(row: ConversationRow) -> Result<Conversation, DatabaseError> {
    Ok(Conversation {
        id: parse_uuid(&row.id)?,
        patient_name: row.patient_name,
        title: row.title,
        status: ConversationState::from_str(&row.status)?,
        symptoms: serde_json::from_str(&row.symptoms)?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_message, open_memory_database};
    use chrono::NaiveDateTime;

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_conversation(conn: &Connection, created: &str) -> Uuid {
        let id = Uuid::new_v4();
        insert_conversation(
            conn,
            &Conversation {
                id,
                patient_name: "Asha".into(),
                title: None,
                status: ConversationState::Started,
                symptoms: SymptomSet::new(),
                created_at: at(created),
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn conversation_insert_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let id = make_conversation(&conn, "2024-03-01 10:00:00");

        let conv = get_conversation(&conn, &id).unwrap().unwrap();
        assert_eq!(conv.id, id);
        assert_eq!(conv.status, ConversationState::Started);
        assert_eq!(conv.patient_name, "Asha");
        assert!(conv.symptoms.is_empty());
        assert_eq!(conv.display_title(), "New Consultation");
        assert_eq!(conv.created_at, at("2024-03-01 10:00:00"));
    }

    #[test]
    fn missing_conversation_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_conversation(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn progress_update_keeps_first_title() {
        let conn = open_memory_database().unwrap();
        let id = make_conversation(&conn, "2024-03-01 10:00:00");
        let symptoms: SymptomSet = [SymptomId::HighFever, SymptomId::Chills].into_iter().collect();

        update_conversation_progress(&conn, &id, &symptoms, ConversationState::Diagnosed, Some("Malaria"))
            .unwrap();
        update_conversation_progress(&conn, &id, &symptoms, ConversationState::Diagnosed, Some("Typhoid"))
            .unwrap();

        let conv = get_conversation(&conn, &id).unwrap().unwrap();
        assert_eq!(conv.title.as_deref(), Some("Malaria"));
        assert_eq!(conv.status, ConversationState::Diagnosed);
        assert_eq!(conv.symptoms, symptoms);
    }

    #[test]
    fn progress_update_on_missing_conversation_fails() {
        let conn = open_memory_database().unwrap();
        let result = update_conversation_progress(
            &conn,
            &Uuid::new_v4(),
            &SymptomSet::new(),
            ConversationState::Active,
            None,
        );
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn summaries_are_newest_first_with_counts() {
        let conn = open_memory_database().unwrap();
        let older = make_conversation(&conn, "2024-03-01 10:00:00");
        let newer = make_conversation(&conn, "2024-03-02 09:00:00");

        insert_message(
            &conn,
            &ChatMessage {
                id: Uuid::new_v4(),
                conversation_id: older,
                sender: MessageSender::Bot,
                content: "Hello".into(),
                options: vec![],
                created_at: at("2024-03-01 10:00:01"),
            },
        )
        .unwrap();

        let summaries = list_conversation_summaries(&conn).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, newer);
        assert_eq!(summaries[0].message_count, 0);
        assert!(summaries[0].last_message_at.is_none());
        assert_eq!(summaries[1].id, older);
        assert_eq!(summaries[1].message_count, 1);
        assert_eq!(summaries[1].title, "New Consultation");
        assert_eq!(summaries[1].last_message_preview, "Hello");
    }

    #[test]
    fn delete_cascades_to_messages() {
        let conn = open_memory_database().unwrap();
        let id = make_conversation(&conn, "2024-03-01 10:00:00");
        insert_message(
            &conn,
            &ChatMessage {
                id: Uuid::new_v4(),
                conversation_id: id,
                sender: MessageSender::User,
                content: "I have a cough".into(),
                options: vec![],
                created_at: at("2024-03-01 10:00:05"),
            },
        )
        .unwrap();

        delete_conversation(&conn, &id).unwrap();
        assert!(get_conversation(&conn, &id).unwrap().is_none());
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);

        assert!(matches!(
            delete_conversation(&conn, &id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn stored_unknown_symptoms_are_dropped_on_read() {
        let conn = open_memory_database().unwrap();
        let id = make_conversation(&conn, "2024-03-01 10:00:00");
        conn.execute(
            "UPDATE conversations SET collected_symptoms = '[\"cough\",\"retired_column\"]' WHERE id = ?1",
            params![id.to_string()],
        )
        .unwrap();
        let conv = get_conversation(&conn, &id).unwrap().unwrap();
        assert_eq!(conv.symptoms.names(), vec!["cough"]);
    }
}
