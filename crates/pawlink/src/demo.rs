// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local two-user messaging demo.
//!
//! Wires the SQLite store, the change hub, and the sync core together:
//! one identity plays the dog owner sending messages, the other runs an
//! unread tracker and an open conversation session reconciling them live.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use pawlink_bus::EventHub;
use pawlink_config::PawlinkConfig;
use pawlink_core::types::{ConversationView, OutgoingMessage, Profile, UserId};
use pawlink_core::{MessageSender, MessageStore, PawlinkError};
use pawlink_storage::{SqliteMessageStore, StoreSender};
use pawlink_sync::{ConversationSession, NotificationPresenter, UnreadTracker};

use crate::surface::TerminalSurface;

/// Run the demo against the configured database path.
pub async fn run(config: &PawlinkConfig) -> Result<(), PawlinkError> {
    let owner = UserId("demo-owner".to_string());
    let walker = UserId("demo-walker".to_string());

    let hub = EventHub::new(config.sync.event_buffer);
    let store = Arc::new(SqliteMessageStore::with_events(
        config.storage.clone(),
        hub.clone(),
    ));
    store.initialize().await?;

    store
        .upsert_profile(&Profile {
            id: owner.clone(),
            first_name: Some("Olive".to_string()),
            last_name: Some("Owner".to_string()),
            photo_url: None,
        })
        .await?;
    store
        .upsert_profile(&Profile {
            id: walker.clone(),
            first_name: Some("Wren".to_string()),
            last_name: Some("Walker".to_string()),
            photo_url: None,
        })
        .await?;

    let sender = Arc::new(StoreSender::new(store.clone()));
    let presenter = Arc::new(NotificationPresenter::new(
        Arc::new(TerminalSurface),
        config.notify.clone(),
    ));

    println!("== owner sends the first message ==");
    sender
        .send(OutgoingMessage {
            sender: owner.clone(),
            recipient: walker.clone(),
            context_id: None,
            body: "Hi! Is anyone free to walk Rex at noon?".to_string(),
        })
        .await?;

    // The walker signs in with the message already waiting.
    println!("== walker signs in ==");
    let tracker = Arc::new(UnreadTracker::new(
        store.clone(),
        hub.clone(),
        config.sync.clone(),
    ));
    tracker.initialize(Some(walker.clone())).await;

    let snapshot = tracker.snapshot().await;
    println!(
        "walker unread: total={} conversations={}",
        snapshot.total,
        snapshot.by_conversation.len()
    );
    if let Some(unread) = tracker.take_welcome_unread().await {
        println!("welcome: {unread} unread message(s) waiting");
    }

    println!("== walker opens the conversation ==");
    let records = store.conversations_for(&walker).await?;
    let Some(record) = records.into_iter().next() else {
        return Err(PawlinkError::Internal(
            "demo conversation was not created".to_string(),
        ));
    };
    let unread_here = snapshot.unread_in(&record.conversation.id);
    let view = ConversationView::project(record, &walker, unread_here);

    let session = ConversationSession::new(
        walker.clone(),
        store.clone(),
        sender.clone(),
        hub.clone(),
        presenter,
        config.sync.clone(),
    );
    session.open(view.clone()).await?;
    tracker
        .mark_conversation_read(
            &view.conversation.id,
            &view.conversation.participant_a,
            &view.conversation.participant_b,
        )
        .await;

    println!("== walker replies ==");
    session.send("Yes! I can take Rex out at noon.").await?;

    println!("== owner answers while the conversation is open ==");
    sender
        .send(OutgoingMessage {
            sender: owner.clone(),
            recipient: walker.clone(),
            context_id: None,
            body: "Wonderful, see you at the park.".to_string(),
        })
        .await?;

    // Give the realtime path room to reconcile and mark the arrival read.
    tokio::time::sleep(config.sync.read_receipt_delay() + Duration::from_millis(500)).await;
    tokio::time::sleep(config.sync.update_debounce() + Duration::from_millis(200)).await;

    println!("== timeline ==");
    for entry in session.timeline().await {
        let msg = entry.message();
        let who = if msg.sender == walker { "walker" } else { "owner" };
        let state = if entry.is_provisional() {
            "sending"
        } else if msg.read {
            "read"
        } else {
            "delivered"
        };
        println!("  {who:>6} [{state}]: {}", msg.body);
    }

    let settled = tracker.snapshot().await;
    println!("walker unread after reading: total={}", settled.total);

    session.close().await;
    tracker.shutdown().await;
    store.close().await?;
    info!("demo complete");
    Ok(())
}
