// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mock of the message store and send endpoint.
//!
//! `MockStore` implements `MessageStore` and `MessageSender` over plain
//! vectors, with injectable per-operation failures, configurable query
//! latency for cancellation tests, and call counters for assertions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use pawlink_bus::{EventHub, MessageChange};
use pawlink_core::types::{
    AdapterKind, Conversation, ConversationId, ConversationRecord, HealthStatus, Message,
    MessageId, OutgoingMessage, Profile, UserId,
};
use pawlink_core::{MessageSender, MessageStore, PawlinkError, ServiceAdapter};

fn store_failure(operation: &str) -> PawlinkError {
    PawlinkError::Store {
        source: format!("mock {operation} failure").into(),
    }
}

/// An in-memory message store for deterministic testing.
pub struct MockStore {
    messages: Mutex<Vec<Message>>,
    conversations: Mutex<Vec<Conversation>>,
    profiles: Mutex<HashMap<UserId, Profile>>,
    events: Option<EventHub>,
    fail_unread: AtomicBool,
    fail_between: AtomicBool,
    fail_mark_conversation: AtomicBool,
    fail_mark_sender: AtomicBool,
    fail_mark_all: AtomicBool,
    fail_send: AtomicBool,
    unread_delay: Mutex<Option<Duration>>,
    between_delay: Mutex<Option<Duration>>,
    unread_calls: AtomicU64,
    between_calls: AtomicU64,
}

impl MockStore {
    /// Create an empty mock store with no change feed.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a mock store that announces inserts and read transitions on
    /// the given hub, like the real store.
    pub fn with_events(events: EventHub) -> Self {
        Self::build(Some(events))
    }

    fn build(events: Option<EventHub>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            conversations: Mutex::new(Vec::new()),
            profiles: Mutex::new(HashMap::new()),
            events,
            fail_unread: AtomicBool::new(false),
            fail_between: AtomicBool::new(false),
            fail_mark_conversation: AtomicBool::new(false),
            fail_mark_sender: AtomicBool::new(false),
            fail_mark_all: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            unread_delay: Mutex::new(None),
            between_delay: Mutex::new(None),
            unread_calls: AtomicU64::new(0),
            between_calls: AtomicU64::new(0),
        }
    }

    // --- Seeding ---

    /// Insert a message row without announcing it.
    pub async fn seed_message(&self, message: Message) {
        self.messages.lock().await.push(message);
    }

    /// Insert a conversation row.
    pub async fn seed_conversation(&self, conversation: Conversation) {
        self.conversations.lock().await.push(conversation);
    }

    /// Insert a profile row.
    pub async fn seed_profile(&self, profile: Profile) {
        self.profiles.lock().await.insert(profile.id.clone(), profile);
    }

    // --- Failure and latency injection ---

    pub fn set_fail_unread(&self, fail: bool) {
        self.fail_unread.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_between(&self, fail: bool) {
        self.fail_between.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_mark_conversation(&self, fail: bool) {
        self.fail_mark_conversation.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_mark_sender(&self, fail: bool) {
        self.fail_mark_sender.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_mark_all(&self, fail: bool) {
        self.fail_mark_all.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Delay every unread query by `delay` (for reload-race tests).
    pub async fn set_unread_delay(&self, delay: Option<Duration>) {
        *self.unread_delay.lock().await = delay;
    }

    /// Delay every between-pair query by `delay` (for cancellation tests).
    pub async fn set_between_delay(&self, delay: Option<Duration>) {
        *self.between_delay.lock().await = delay;
    }

    // --- Assertions ---

    /// How many unread queries have been issued.
    pub fn unread_calls(&self) -> u64 {
        self.unread_calls.load(Ordering::SeqCst)
    }

    /// How many between-pair queries have been issued.
    pub fn between_calls(&self) -> u64 {
        self.between_calls.load(Ordering::SeqCst)
    }

    /// All stored messages, in insertion order.
    pub async fn all_messages(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }

    fn publish(&self, change: MessageChange) {
        if let Some(hub) = &self.events {
            hub.publish(change);
        }
    }

    async fn mark_where<F>(&self, predicate: F) -> u64
    where
        F: Fn(&Message) -> bool,
    {
        let now = Utc::now();
        let mut marked = Vec::new();
        {
            let mut messages = self.messages.lock().await;
            for msg in messages.iter_mut() {
                if !msg.read && predicate(msg) {
                    msg.read = true;
                    msg.read_at = Some(now);
                    marked.push(msg.clone());
                }
            }
        }
        let count = marked.len() as u64;
        for message in marked {
            self.publish(MessageChange::Updated {
                message,
                was_read: false,
            });
        }
        count
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, PawlinkError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PawlinkError> {
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MockStore {
    async fn initialize(&self) -> Result<(), PawlinkError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), PawlinkError> {
        Ok(())
    }

    async fn unread_for(&self, recipient: &UserId) -> Result<Vec<Message>, PawlinkError> {
        self.unread_calls.fetch_add(1, Ordering::SeqCst);

        // Snapshot before any delay, so a slow query returns data as of
        // its initiation (what a stale in-flight response looks like).
        let mut unread: Vec<Message> = self
            .messages
            .lock()
            .await
            .iter()
            .filter(|m| m.recipient == *recipient && !m.read)
            .cloned()
            .collect();
        unread.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let delay = *self.unread_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_unread.load(Ordering::SeqCst) {
            return Err(store_failure("unread query"));
        }
        Ok(unread)
    }

    async fn between(&self, a: &UserId, b: &UserId) -> Result<Vec<Message>, PawlinkError> {
        self.between_calls.fetch_add(1, Ordering::SeqCst);

        let mut messages: Vec<Message> = self
            .messages
            .lock()
            .await
            .iter()
            .filter(|m| m.between_pair(a, b))
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let delay = *self.between_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_between.load(Ordering::SeqCst) {
            return Err(store_failure("between query"));
        }
        Ok(messages)
    }

    async fn insert_message(&self, message: &Message) -> Result<(), PawlinkError> {
        self.messages.lock().await.push(message.clone());
        self.publish(MessageChange::Inserted {
            message: message.clone(),
        });
        Ok(())
    }

    async fn mark_conversation_read(
        &self,
        conversation: &ConversationId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError> {
        if self.fail_mark_conversation.load(Ordering::SeqCst) {
            return Err(store_failure("mark by conversation"));
        }
        Ok(self
            .mark_where(|m| {
                m.conversation_id.as_ref() == Some(conversation) && m.recipient == *recipient
            })
            .await)
    }

    async fn mark_sender_read(
        &self,
        sender: &UserId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError> {
        if self.fail_mark_sender.load(Ordering::SeqCst) {
            return Err(store_failure("mark by sender"));
        }
        Ok(self
            .mark_where(|m| m.sender == *sender && m.recipient == *recipient)
            .await)
    }

    async fn mark_message_read(
        &self,
        id: &MessageId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError> {
        Ok(self
            .mark_where(|m| m.id == *id && m.recipient == *recipient)
            .await)
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, PawlinkError> {
        if self.fail_mark_all.load(Ordering::SeqCst) {
            return Err(store_failure("mark all"));
        }
        Ok(self.mark_where(|m| m.recipient == *recipient).await)
    }

    async fn conversation_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, PawlinkError> {
        Ok(self
            .conversations
            .lock()
            .await
            .iter()
            .find(|c| {
                (c.participant_a == *a && c.participant_b == *b)
                    || (c.participant_a == *b && c.participant_b == *a)
            })
            .cloned())
    }

    async fn conversations_for(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<ConversationRecord>, PawlinkError> {
        let profiles = self.profiles.lock().await;
        let profile_or_empty = |id: &UserId| {
            profiles.get(id).cloned().unwrap_or_else(|| Profile {
                id: id.clone(),
                first_name: None,
                last_name: None,
                photo_url: None,
            })
        };

        let mut records: Vec<ConversationRecord> = self
            .conversations
            .lock()
            .await
            .iter()
            .filter(|c| c.involves(viewer))
            .map(|c| ConversationRecord {
                conversation: c.clone(),
                profile_a: profile_or_empty(&c.participant_a),
                profile_b: profile_or_empty(&c.participant_b),
            })
            .collect();
        records.sort_by(|a, b| {
            b.conversation
                .last_activity
                .cmp(&a.conversation.last_activity)
        });
        Ok(records)
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), PawlinkError> {
        self.profiles
            .lock()
            .await
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn profile(&self, id: &UserId) -> Result<Option<Profile>, PawlinkError> {
        Ok(self.profiles.lock().await.get(id).cloned())
    }
}

#[async_trait]
impl MessageSender for MockStore {
    async fn send(&self, outgoing: OutgoingMessage) -> Result<Message, PawlinkError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(PawlinkError::Delivery {
                message: "mock send failure".to_string(),
                source: None,
            });
        }

        let body = outgoing.body.trim();
        if body.is_empty() {
            return Err(PawlinkError::InvalidInput(
                "message body must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let conversation = match self
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
                self.conversations.lock().await.push(conversation.clone());
                conversation
            }
        };

        let message = Message {
            id: MessageId(uuid::Uuid::new_v4().to_string()),
            sender: outgoing.sender,
            recipient: outgoing.recipient,
            conversation_id: Some(conversation.id.clone()),
            context_id: outgoing.context_id,
            body: body.to_string(),
            created_at: now,
            read: false,
            read_at: None,
        };
        self.insert_message(&message).await?;

        {
            let mut conversations = self.conversations.lock().await;
            if let Some(stored) = conversations.iter_mut().find(|c| c.id == conversation.id) {
                stored.last_activity = now;
            }
        }

        Ok(message)
    }
}
