// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations and profile-joined listings.

use chrono::{DateTime, Utc};
use pawlink_core::types::{
    ContextId, Conversation, ConversationId, ConversationRecord, Profile, UserId,
};
use pawlink_core::PawlinkError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::{fmt_timestamp, parse_timestamp};

/// Map one result row onto a [`Conversation`].
fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: ConversationId(row.get(0)?),
        participant_a: UserId(row.get(1)?),
        participant_b: UserId(row.get(2)?),
        context_id: row.get::<_, Option<String>>(3)?.map(ContextId),
        created_at: parse_timestamp(4, row.get(4)?)?,
        last_activity: parse_timestamp(5, row.get(5)?)?,
    })
}

/// Insert a new conversation row.
pub async fn create_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), PawlinkError> {
    let conv = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, participant_a, participant_b, context_id, created_at, last_activity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    conv.id.0,
                    conv.participant_a.0,
                    conv.participant_b.0,
                    conv.context_id.as_ref().map(|c| c.0.clone()),
                    fmt_timestamp(conv.created_at),
                    fmt_timestamp(conv.last_activity),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Find the conversation pairing the two participants, in either order.
pub async fn conversation_between(
    db: &Database,
    a: &UserId,
    b: &UserId,
) -> Result<Option<Conversation>, PawlinkError> {
    let a = a.clone();
    let b = b.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, participant_a, participant_b, context_id, created_at, last_activity
                 FROM conversations
                 WHERE (participant_a = ?1 AND participant_b = ?2)
                    OR (participant_a = ?2 AND participant_b = ?1)
                 LIMIT 1",
            )?;
            let mut rows = stmt.query_map(params![a.0, b.0], row_to_conversation)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All conversations involving the viewer, joined with both participant
/// profiles, most recent activity first.
///
/// Participants without a profile row fall back to an empty profile so the
/// projection can still render a placeholder name.
pub async fn conversations_for(
    db: &Database,
    viewer: &UserId,
) -> Result<Vec<ConversationRecord>, PawlinkError> {
    let viewer = viewer.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.participant_a, c.participant_b, c.context_id, c.created_at, c.last_activity,
                        pa.first_name, pa.last_name, pa.photo_url,
                        pb.first_name, pb.last_name, pb.photo_url
                 FROM conversations c
                 LEFT JOIN profiles pa ON pa.id = c.participant_a
                 LEFT JOIN profiles pb ON pb.id = c.participant_b
                 WHERE c.participant_a = ?1 OR c.participant_b = ?1
                 ORDER BY c.last_activity DESC",
            )?;
            let rows = stmt.query_map(params![viewer.0], |row| {
                let conversation = row_to_conversation(row)?;
                let profile_a = Profile {
                    id: conversation.participant_a.clone(),
                    first_name: row.get(6)?,
                    last_name: row.get(7)?,
                    photo_url: row.get(8)?,
                };
                let profile_b = Profile {
                    id: conversation.participant_b.clone(),
                    first_name: row.get(9)?,
                    last_name: row.get(10)?,
                    photo_url: row.get(11)?,
                };
                Ok(ConversationRecord {
                    conversation,
                    profile_a,
                    profile_b,
                })
            })?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Bump a conversation's last-activity timestamp.
pub async fn touch_last_activity(
    db: &Database,
    id: &ConversationId,
    at: DateTime<Utc>,
) -> Result<(), PawlinkError> {
    let id = id.clone();
    let at = fmt_timestamp(at);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET last_activity = ?1 WHERE id = ?2",
                params![at, id.0],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
