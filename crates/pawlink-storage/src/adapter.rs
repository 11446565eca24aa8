// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MessageStore trait.
//!
//! When constructed with an [`EventHub`], every successful insert and
//! read-state mutation publishes a row-level change, standing in for the
//! hosted platform's change feed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use pawlink_bus::{EventHub, MessageChange};
use pawlink_config::model::StorageConfig;
use pawlink_core::types::{
    AdapterKind, Conversation, ConversationId, ConversationRecord, HealthStatus, Message,
    MessageId, Profile, UserId,
};
use pawlink_core::{MessageStore, PawlinkError, ServiceAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed message store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`MessageStore::initialize`].
pub struct SqliteMessageStore {
    config: StorageConfig,
    db: OnceCell<Database>,
    events: Option<EventHub>,
}

impl SqliteMessageStore {
    /// Create a new store with the given configuration and no change feed.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
            events: None,
        }
    }

    /// Create a store that publishes every insert and read-state change
    /// into the given hub.
    pub fn with_events(config: StorageConfig, events: EventHub) -> Self {
        Self {
            config,
            db: OnceCell::new(),
            events: Some(events),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, PawlinkError> {
        self.db.get().ok_or_else(|| PawlinkError::Store {
            source: "store not initialized -- call initialize() first".into(),
        })
    }

    /// Publish read-flag transitions for freshly marked rows and return
    /// how many there were.
    fn publish_marked(&self, marked: Vec<Message>) -> u64 {
        let count = marked.len() as u64;
        if let Some(hub) = &self.events {
            for message in marked {
                hub.publish(MessageChange::Updated {
                    message,
                    was_read: false,
                });
            }
        }
        count
    }

    /// Insert a new conversation row.
    pub async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), PawlinkError> {
        queries::conversations::create_conversation(self.db()?, conversation).await
    }

    /// Bump a conversation's last-activity timestamp.
    pub async fn touch_conversation(
        &self,
        id: &ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), PawlinkError> {
        queries::conversations::touch_last_activity(self.db()?, id, at).await
    }
}

#[async_trait]
impl ServiceAdapter for SqliteMessageStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, PawlinkError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PawlinkError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn initialize(&self) -> Result<(), PawlinkError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| PawlinkError::Store {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite message store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), PawlinkError> {
        self.db()?.close().await
    }

    async fn unread_for(&self, recipient: &UserId) -> Result<Vec<Message>, PawlinkError> {
        queries::messages::unread_for(self.db()?, recipient).await
    }

    async fn between(&self, a: &UserId, b: &UserId) -> Result<Vec<Message>, PawlinkError> {
        queries::messages::between(self.db()?, a, b).await
    }

    async fn insert_message(&self, message: &Message) -> Result<(), PawlinkError> {
        queries::messages::insert_message(self.db()?, message).await?;
        if let Some(hub) = &self.events {
            hub.publish(MessageChange::Inserted {
                message: message.clone(),
            });
        }
        Ok(())
    }

    async fn mark_conversation_read(
        &self,
        conversation: &ConversationId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError> {
        let marked = queries::messages::mark_conversation_read(
            self.db()?,
            conversation,
            recipient,
            Utc::now(),
        )
        .await?;
        Ok(self.publish_marked(marked))
    }

    async fn mark_sender_read(
        &self,
        sender: &UserId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError> {
        let marked =
            queries::messages::mark_sender_read(self.db()?, sender, recipient, Utc::now()).await?;
        Ok(self.publish_marked(marked))
    }

    async fn mark_message_read(
        &self,
        id: &MessageId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError> {
        let marked =
            queries::messages::mark_message_read(self.db()?, id, recipient, Utc::now()).await?;
        Ok(self.publish_marked(marked))
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, PawlinkError> {
        let marked = queries::messages::mark_all_read(self.db()?, recipient, Utc::now()).await?;
        Ok(self.publish_marked(marked))
    }

    async fn conversation_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, PawlinkError> {
        queries::conversations::conversation_between(self.db()?, a, b).await
    }

    async fn conversations_for(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<ConversationRecord>, PawlinkError> {
        queries::conversations::conversations_for(self.db()?, viewer).await
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), PawlinkError> {
        queries::profiles::upsert_profile(self.db()?, profile).await
    }

    async fn profile(&self, id: &UserId) -> Result<Option<Profile>, PawlinkError> {
        queries::profiles::get_profile(self.db()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawlink_bus::SubscriptionScope;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn make_msg(id: &str, sender: &str, recipient: &str, body: &str) -> Message {
        Message {
            id: MessageId(id.to_string()),
            sender: UserId(sender.to_string()),
            recipient: UserId(recipient.to_string()),
            conversation_id: Some(ConversationId("c1".to_string())),
            context_id: None,
            body: body.to_string(),
            created_at: Utc::now(),
            read: false,
            read_at: None,
        }
    }

    #[tokio::test]
    async fn store_implements_service_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("adapter.db");
        let store = SqliteMessageStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.kind(), AdapterKind::Store);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteMessageStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        let result = store.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteMessageStore::new(make_config(db_path.to_str().unwrap()));

        let result = store.health_check().await;
        assert!(result.is_err(), "health_check should fail before initialize");
    }

    #[tokio::test]
    async fn full_message_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteMessageStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);

        let alice = UserId("alice".into());
        let bob = UserId("bob".into());

        store
            .insert_message(&make_msg("m1", "alice", "bob", "hello"))
            .await
            .unwrap();
        store
            .insert_message(&make_msg("m2", "alice", "bob", "anyone home?"))
            .await
            .unwrap();

        let unread = store.unread_for(&bob).await.unwrap();
        assert_eq!(unread.len(), 2);

        let timeline = store.between(&alice, &bob).await.unwrap();
        assert_eq!(timeline.len(), 2);

        let marked = store
            .mark_conversation_read(&ConversationId("c1".into()), &bob)
            .await
            .unwrap();
        assert_eq!(marked, 2);

        // Idempotent: nothing left to mark.
        let marked = store
            .mark_conversation_read(&ConversationId("c1".into()), &bob)
            .await
            .unwrap();
        assert_eq!(marked, 0);

        assert!(store.unread_for(&bob).await.unwrap().is_empty());

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn insert_publishes_change_to_hub() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("events.db");
        let hub = EventHub::new(16);
        let store =
            SqliteMessageStore::with_events(make_config(db_path.to_str().unwrap()), hub.clone());
        store.initialize().await.unwrap();

        let mut sub = hub.subscribe(SubscriptionScope::Viewer(UserId("bob".into())));

        store
            .insert_message(&make_msg("m1", "alice", "bob", "woof"))
            .await
            .unwrap();

        let change = sub.recv().await.expect("insert should be announced");
        assert!(matches!(change, MessageChange::Inserted { .. }));
        assert_eq!(change.message().id.0, "m1");

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_read_publishes_update_transitions() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("mark_events.db");
        let hub = EventHub::new(16);
        let store =
            SqliteMessageStore::with_events(make_config(db_path.to_str().unwrap()), hub.clone());
        store.initialize().await.unwrap();

        store
            .insert_message(&make_msg("m1", "alice", "bob", "woof"))
            .await
            .unwrap();

        let mut sub = hub.subscribe(SubscriptionScope::Viewer(UserId("bob".into())));
        let marked = store
            .mark_all_read(&UserId("bob".into()))
            .await
            .unwrap();
        assert_eq!(marked, 1);

        let change = sub.recv().await.expect("mark should be announced");
        assert!(change.is_read_transition());
        assert_eq!(change.message().id.0, "m1");

        store.shutdown().await.unwrap();
    }
}
