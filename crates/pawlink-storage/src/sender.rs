// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send endpoint over the SQLite store.
//!
//! Resolves or creates the conversation for the sender/recipient pair,
//! assigns the authoritative message id, bumps last activity, and lets the
//! store announce the insert on the change hub.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use pawlink_core::types::{Conversation, ConversationId, Message, MessageId, OutgoingMessage};
use pawlink_core::{MessageSender, MessageStore, PawlinkError};

use crate::adapter::SqliteMessageStore;

/// [`MessageSender`] implementation backed by the local SQLite store.
pub struct StoreSender {
    store: Arc<SqliteMessageStore>,
}

impl StoreSender {
    /// Create a sender over an initialized store.
    pub fn new(store: Arc<SqliteMessageStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MessageSender for StoreSender {
    async fn send(&self, outgoing: OutgoingMessage) -> Result<Message, PawlinkError> {
        let body = outgoing.body.trim();
        if body.is_empty() {
            return Err(PawlinkError::InvalidInput(
                "message body must not be empty".to_string(),
            ));
        }

        let now = Utc::now();

        // Conversations come into existence on first exchange between two
        // identities; afterwards the existing pairing is reused.
        let conversation = match self
            .store
            .conversation_between(&outgoing.sender, &outgoing.recipient)
            .await?
        {
            Some(existing) => existing,
            None => {
                let conversation = Conversation {
                    id: ConversationId(uuid::Uuid::new_v4().to_string()),
                    participant_a: outgoing.sender.clone(),
                    participant_b: outgoing.recipient.clone(),
                    context_id: outgoing.context_id.clone(),
                    created_at: now,
                    last_activity: now,
                };
                self.store.create_conversation(&conversation).await?;
                debug!(
                    conversation = %conversation.id,
                    "created conversation on first exchange"
                );
                conversation
            }
        };

        let message = Message {
            id: MessageId(uuid::Uuid::new_v4().to_string()),
            sender: outgoing.sender,
            recipient: outgoing.recipient,
            conversation_id: Some(conversation.id.clone()),
            context_id: outgoing.context_id.or_else(|| conversation.context_id.clone()),
            body: body.to_string(),
            created_at: now,
            read: false,
            read_at: None,
        };

        self.store.insert_message(&message).await?;
        self.store.touch_conversation(&conversation.id, now).await?;

        info!(
            message = %message.id,
            conversation = %conversation.id,
            "message delivered"
        );

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawlink_bus::{EventHub, MessageChange, SubscriptionScope};
    use pawlink_config::model::StorageConfig;
    use pawlink_core::types::UserId;
    use tempfile::tempdir;

    async fn setup() -> (Arc<SqliteMessageStore>, EventHub, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("sender.db");
        let hub = EventHub::new(16);
        let store = Arc::new(SqliteMessageStore::with_events(
            StorageConfig {
                database_path: db_path.to_str().unwrap().to_string(),
                wal_mode: true,
            },
            hub.clone(),
        ));
        store.initialize().await.unwrap();
        (store, hub, dir)
    }

    fn outgoing(sender: &str, recipient: &str, body: &str) -> OutgoingMessage {
        OutgoingMessage {
            sender: UserId(sender.to_string()),
            recipient: UserId(recipient.to_string()),
            context_id: None,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn send_creates_conversation_on_first_exchange() {
        let (store, _hub, _dir) = setup().await;
        let sender = StoreSender::new(store.clone());

        let sent = sender.send(outgoing("alice", "bob", "hello")).await.unwrap();
        assert!(!sent.id.is_provisional());
        assert!(sent.conversation_id.is_some());
        assert!(!sent.read);

        let conversation = store
            .conversation_between(&UserId("alice".into()), &UserId("bob".into()))
            .await
            .unwrap()
            .expect("conversation should exist");
        assert_eq!(sent.conversation_id.as_ref(), Some(&conversation.id));
    }

    #[tokio::test]
    async fn send_reuses_existing_conversation_in_either_direction() {
        let (store, _hub, _dir) = setup().await;
        let sender = StoreSender::new(store.clone());

        let first = sender.send(outgoing("alice", "bob", "hello")).await.unwrap();
        let reply = sender.send(outgoing("bob", "alice", "hi back")).await.unwrap();
        assert_eq!(first.conversation_id, reply.conversation_id);

        let records = store
            .conversations_for(&UserId("alice".into()))
            .await
            .unwrap();
        assert_eq!(records.len(), 1, "no duplicate conversation rows");
    }

    #[tokio::test]
    async fn send_rejects_whitespace_only_body() {
        let (store, _hub, _dir) = setup().await;
        let sender = StoreSender::new(store);

        let result = sender.send(outgoing("alice", "bob", "   \n\t ")).await;
        assert!(matches!(result, Err(PawlinkError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn send_trims_body_and_announces_insert() {
        let (store, hub, _dir) = setup().await;
        let sender = StoreSender::new(store);

        let mut sub = hub.subscribe(SubscriptionScope::Viewer(UserId("bob".into())));
        let sent = sender
            .send(outgoing("alice", "bob", "  walk at noon?  "))
            .await
            .unwrap();
        assert_eq!(sent.body, "walk at noon?");

        let change = sub.recv().await.expect("send should be announced");
        assert!(matches!(change, MessageChange::Inserted { .. }));
        assert_eq!(change.message().id, sent.id);
    }
}
