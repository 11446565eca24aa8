// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring helpers: a hub, a mock store, a tracker, and builders for the
//! rows the scenarios exercise.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use pawlink_bus::EventHub;
use pawlink_config::model::{NotifyConfig, SyncConfig};
use pawlink_core::types::{
    Conversation, ConversationId, ConversationView, Message, MessageId, Profile, UserId,
};
use pawlink_sync::{ConversationSession, NotificationPresenter, UnreadTracker};

use crate::mock_store::MockStore;
use crate::mock_surface::MockSurface;

/// A fully wired sync core over mock collaborators.
pub struct TestHarness {
    pub hub: EventHub,
    pub store: Arc<MockStore>,
    pub surface: Arc<MockSurface>,
    pub presenter: Arc<NotificationPresenter>,
    pub tracker: Arc<UnreadTracker>,
    pub sync_config: SyncConfig,
}

impl TestHarness {
    /// Build a harness with default timing configuration. The mock store
    /// announces its changes on the harness hub, like the real store.
    pub fn new() -> Self {
        let hub = EventHub::new(64);
        let store = Arc::new(MockStore::with_events(hub.clone()));
        let surface = Arc::new(MockSurface::new());
        let sync_config = SyncConfig::default();
        let presenter = Arc::new(NotificationPresenter::new(
            surface.clone(),
            NotifyConfig::default(),
        ));
        let tracker = Arc::new(UnreadTracker::new(
            store.clone(),
            hub.clone(),
            sync_config.clone(),
        ));
        Self {
            hub,
            store,
            surface,
            presenter,
            tracker,
            sync_config,
        }
    }

    /// A conversation session for the given viewer, sharing the harness
    /// store, hub, and presenter.
    pub fn session_for(&self, viewer: UserId) -> ConversationSession {
        ConversationSession::new(
            viewer,
            self.store.clone(),
            self.store.clone(),
            self.hub.clone(),
            self.presenter.clone(),
            self.sync_config.clone(),
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A deterministic timestamp `secs` seconds after a fixed base instant.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_735_000_000 + secs, 0).unwrap()
}

/// An unread message row with an authoritative id.
pub fn unread_message(
    id: &str,
    sender: &str,
    recipient: &str,
    conversation: &str,
    body: &str,
    at_secs: i64,
) -> Message {
    Message {
        id: MessageId(id.to_string()),
        sender: UserId(sender.to_string()),
        recipient: UserId(recipient.to_string()),
        conversation_id: Some(ConversationId(conversation.to_string())),
        context_id: None,
        body: body.to_string(),
        created_at: at(at_secs),
        read: false,
        read_at: None,
    }
}

/// A conversation row between two participants.
pub fn test_conversation(id: &str, a: &str, b: &str) -> Conversation {
    Conversation {
        id: ConversationId(id.to_string()),
        participant_a: UserId(a.to_string()),
        participant_b: UserId(b.to_string()),
        context_id: None,
        created_at: at(0),
        last_activity: at(0),
    }
}

/// A viewer-relative view of a conversation, with the other participant's
/// id standing in for a display name.
pub fn view_for(conversation: &Conversation, viewer: &UserId) -> ConversationView {
    let other_id = conversation.other_participant(viewer).clone();
    let other = Profile {
        id: other_id.clone(),
        first_name: Some(other_id.0.clone()),
        last_name: None,
        photo_url: None,
    };
    let display_name = other.display_name();
    ConversationView {
        conversation: conversation.clone(),
        other,
        display_name,
        unread: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_produce_consistent_rows() {
        let conversation = test_conversation("c1", "alice", "bob");
        let message = unread_message("m1", "alice", "bob", "c1", "hi", 5);
        assert_eq!(
            message.conversation_id.as_ref(),
            Some(&conversation.id)
        );
        assert!(message.between_pair(
            &conversation.participant_a,
            &conversation.participant_b
        ));
        assert!(message.created_at > conversation.created_at);
    }

    #[test]
    fn view_resolves_other_participant() {
        let conversation = test_conversation("c1", "alice", "bob");
        let view = view_for(&conversation, &UserId("alice".into()));
        assert_eq!(view.other.id.0, "bob");
        assert_eq!(view.display_name, "bob");
    }

    #[tokio::test]
    async fn harness_wires_store_to_hub() {
        let harness = TestHarness::new();
        let mut sub = harness.hub.subscribe(pawlink_bus::SubscriptionScope::Viewer(
            UserId("bob".into()),
        ));

        use pawlink_core::MessageStore;
        harness
            .store
            .insert_message(&unread_message("m1", "alice", "bob", "c1", "hi", 1))
            .await
            .unwrap();

        let change = sub.recv().await.expect("insert should be announced");
        assert_eq!(change.message().id.0, "m1");
    }
}
