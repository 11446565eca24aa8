// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message queries and read-state mutations.
//!
//! Read-state mutations use `UPDATE ... RETURNING` so the changed rows come
//! back in the same statement; the adapter feeds them into the change hub.

use chrono::{DateTime, Utc};
use pawlink_core::types::{ContextId, ConversationId, Message, MessageId, UserId};
use pawlink_core::PawlinkError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::{fmt_timestamp, parse_timestamp};

const MESSAGE_COLUMNS: &str =
    "id, sender_id, recipient_id, conversation_id, context_id, body, created_at, is_read, read_at";

/// Map one result row onto a [`Message`].
pub(crate) fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: MessageId(row.get(0)?),
        sender: UserId(row.get(1)?),
        recipient: UserId(row.get(2)?),
        conversation_id: row.get::<_, Option<String>>(3)?.map(ConversationId),
        context_id: row.get::<_, Option<String>>(4)?.map(ContextId),
        body: row.get(5)?,
        created_at: parse_timestamp(6, row.get(6)?)?,
        read: row.get(7)?,
        read_at: row
            .get::<_, Option<String>>(8)?
            .map(|s| parse_timestamp(8, s))
            .transpose()?,
    })
}

/// Insert a new message row.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), PawlinkError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, sender_id, recipient_id, conversation_id, context_id, body, created_at, is_read, read_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    msg.id.0,
                    msg.sender.0,
                    msg.recipient.0,
                    msg.conversation_id.as_ref().map(|c| c.0.clone()),
                    msg.context_id.as_ref().map(|c| c.0.clone()),
                    msg.body,
                    fmt_timestamp(msg.created_at),
                    msg.read,
                    msg.read_at.map(fmt_timestamp),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All unread messages addressed to the recipient, newest first.
pub async fn unread_for(db: &Database, recipient: &UserId) -> Result<Vec<Message>, PawlinkError> {
    let recipient = recipient.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE recipient_id = ?1 AND is_read = 0
                 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![recipient.0], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// All messages between the two participants, ascending by creation time.
pub async fn between(
    db: &Database,
    a: &UserId,
    b: &UserId,
) -> Result<Vec<Message>, PawlinkError> {
    let a = a.clone();
    let b = b.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE (sender_id = ?1 AND recipient_id = ?2)
                    OR (sender_id = ?2 AND recipient_id = ?1)
                 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![a.0, b.0], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark unread messages in a conversation, addressed to the recipient, read.
/// Returns the rows that were changed.
pub async fn mark_conversation_read(
    db: &Database,
    conversation: &ConversationId,
    recipient: &UserId,
    read_at: DateTime<Utc>,
) -> Result<Vec<Message>, PawlinkError> {
    let conversation = conversation.clone();
    let recipient = recipient.clone();
    let read_at = fmt_timestamp(read_at);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "UPDATE messages SET is_read = 1, read_at = ?1
                 WHERE conversation_id = ?2 AND recipient_id = ?3 AND is_read = 0
                 RETURNING {MESSAGE_COLUMNS}"
            ))?;
            let rows =
                stmt.query_map(params![read_at, conversation.0, recipient.0], row_to_message)?;
            let mut marked = Vec::new();
            for row in rows {
                marked.push(row?);
            }
            Ok(marked)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark unread messages from `sender` to `recipient` read, covering legacy
/// rows without a conversation id. Returns the rows that were changed.
pub async fn mark_sender_read(
    db: &Database,
    sender: &UserId,
    recipient: &UserId,
    read_at: DateTime<Utc>,
) -> Result<Vec<Message>, PawlinkError> {
    let sender = sender.clone();
    let recipient = recipient.clone();
    let read_at = fmt_timestamp(read_at);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "UPDATE messages SET is_read = 1, read_at = ?1
                 WHERE sender_id = ?2 AND recipient_id = ?3 AND is_read = 0
                 RETURNING {MESSAGE_COLUMNS}"
            ))?;
            let rows = stmt.query_map(params![read_at, sender.0, recipient.0], row_to_message)?;
            let mut marked = Vec::new();
            for row in rows {
                marked.push(row?);
            }
            Ok(marked)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark one specific unread message read, if addressed to the recipient.
/// Returns the row when it was changed.
pub async fn mark_message_read(
    db: &Database,
    id: &MessageId,
    recipient: &UserId,
    read_at: DateTime<Utc>,
) -> Result<Vec<Message>, PawlinkError> {
    let id = id.clone();
    let recipient = recipient.clone();
    let read_at = fmt_timestamp(read_at);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "UPDATE messages SET is_read = 1, read_at = ?1
                 WHERE id = ?2 AND recipient_id = ?3 AND is_read = 0
                 RETURNING {MESSAGE_COLUMNS}"
            ))?;
            let rows = stmt.query_map(params![read_at, id.0, recipient.0], row_to_message)?;
            let mut marked = Vec::new();
            for row in rows {
                marked.push(row?);
            }
            Ok(marked)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark every unread message addressed to the recipient read.
/// Returns the rows that were changed.
pub async fn mark_all_read(
    db: &Database,
    recipient: &UserId,
    read_at: DateTime<Utc>,
) -> Result<Vec<Message>, PawlinkError> {
    let recipient = recipient.clone();
    let read_at = fmt_timestamp(read_at);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "UPDATE messages SET is_read = 1, read_at = ?1
                 WHERE recipient_id = ?2 AND is_read = 0
                 RETURNING {MESSAGE_COLUMNS}"
            ))?;
            let rows = stmt.query_map(params![read_at, recipient.0], row_to_message)?;
            let mut marked = Vec::new();
            for row in rows {
                marked.push(row?);
            }
            Ok(marked)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_msg(id: &str, sender: &str, recipient: &str, body: &str, timestamp: &str) -> Message {
        Message {
            id: MessageId(id.to_string()),
            sender: UserId(sender.to_string()),
            recipient: UserId(recipient.to_string()),
            conversation_id: Some(ConversationId("conv-1".to_string())),
            context_id: None,
            body: body.to_string(),
            created_at: DateTime::parse_from_rfc3339(timestamp)
                .unwrap()
                .with_timezone(&Utc),
            read: false,
            read_at: None,
        }
    }

    #[tokio::test]
    async fn insert_and_query_between_in_order() {
        let (db, _dir) = setup_db().await;

        let m1 = make_msg("m1", "alice", "bob", "hello", "2026-01-01T00:00:01.000Z");
        let m2 = make_msg("m2", "bob", "alice", "hi there", "2026-01-01T00:00:02.000Z");
        let m3 = make_msg("m3", "alice", "bob", "walk at noon?", "2026-01-01T00:00:03.000Z");

        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m3).await.unwrap();
        insert_message(&db, &m2).await.unwrap();

        let alice = UserId("alice".into());
        let bob = UserId("bob".into());
        let messages = between(&db, &alice, &bob).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].id.0, "m1");
        assert_eq!(messages[1].id.0, "m2");
        assert_eq!(messages[2].id.0, "m3");

        // The pair query excludes other participants.
        let carol = UserId("carol".into());
        let none = between(&db, &alice, &carol).await.unwrap();
        assert!(none.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unread_for_returns_newest_first() {
        let (db, _dir) = setup_db().await;

        let m1 = make_msg("m1", "alice", "bob", "one", "2026-01-01T00:00:01.000Z");
        let m2 = make_msg("m2", "alice", "bob", "two", "2026-01-01T00:00:02.000Z");
        let mut m3 = make_msg("m3", "alice", "bob", "three", "2026-01-01T00:00:03.000Z");
        m3.read = true;
        m3.read_at = Some(Utc::now());

        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m2).await.unwrap();
        insert_message(&db, &m3).await.unwrap();

        let unread = unread_for(&db, &UserId("bob".into())).await.unwrap();
        assert_eq!(unread.len(), 2);
        assert_eq!(unread[0].id.0, "m2");
        assert_eq!(unread[1].id.0, "m1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_conversation_read_returns_changed_rows() {
        let (db, _dir) = setup_db().await;

        let m1 = make_msg("m1", "alice", "bob", "one", "2026-01-01T00:00:01.000Z");
        let m2 = make_msg("m2", "alice", "bob", "two", "2026-01-01T00:00:02.000Z");
        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m2).await.unwrap();

        let marked = mark_conversation_read(
            &db,
            &ConversationId("conv-1".into()),
            &UserId("bob".into()),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(marked.len(), 2);
        assert!(marked.iter().all(|m| m.read && m.read_at.is_some()));

        // Second attempt changes nothing.
        let again = mark_conversation_read(
            &db,
            &ConversationId("conv-1".into()),
            &UserId("bob".into()),
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(again.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_sender_read_covers_rows_without_conversation_id() {
        let (db, _dir) = setup_db().await;

        // A legacy row with no conversation id.
        let mut legacy = make_msg("legacy", "alice", "bob", "old", "2026-01-01T00:00:01.000Z");
        legacy.conversation_id = None;
        insert_message(&db, &legacy).await.unwrap();

        // The conversation-id predicate cannot reach it.
        let by_conv = mark_conversation_read(
            &db,
            &ConversationId("conv-1".into()),
            &UserId("bob".into()),
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(by_conv.is_empty());

        // The participant predicate can.
        let by_sender = mark_sender_read(
            &db,
            &UserId("alice".into()),
            &UserId("bob".into()),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(by_sender.len(), 1);
        assert_eq!(by_sender[0].id.0, "legacy");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_message_read_is_scoped_to_recipient() {
        let (db, _dir) = setup_db().await;

        let m1 = make_msg("m1", "alice", "bob", "one", "2026-01-01T00:00:01.000Z");
        insert_message(&db, &m1).await.unwrap();

        // The sender cannot mark their own outbound message read.
        let wrong = mark_message_read(
            &db,
            &MessageId("m1".into()),
            &UserId("alice".into()),
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(wrong.is_empty());

        let right = mark_message_read(
            &db,
            &MessageId("m1".into()),
            &UserId("bob".into()),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(right.len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_all_read_clears_every_unread_row() {
        let (db, _dir) = setup_db().await;

        let mut m1 = make_msg("m1", "alice", "bob", "one", "2026-01-01T00:00:01.000Z");
        m1.conversation_id = None;
        let m2 = make_msg("m2", "carol", "bob", "two", "2026-01-01T00:00:02.000Z");
        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m2).await.unwrap();

        let marked = mark_all_read(&db, &UserId("bob".into()), Utc::now())
            .await
            .unwrap();
        assert_eq!(marked.len(), 2);

        let unread = unread_for(&db, &UserId("bob".into())).await.unwrap();
        assert!(unread.is_empty());

        db.close().await.unwrap();
    }
}
