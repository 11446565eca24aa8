// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation session owning an ordered, de-duplicated, live timeline.
//!
//! The session goes through states: Idle -> Loading -> Ready, with
//! Ready/Loading -> Error on fetch failure and Error -> Loading on retry.
//! Switching conversations bumps a generation counter compared at
//! resolution time, so a late load result for an abandoned conversation is
//! discarded, never applied.
//!
//! Timeline entries are a tagged variant: a locally sent message starts as
//! `Provisional` and is superseded by its `Confirmed` counterpart arriving
//! through the realtime feed, matched by sender+recipient+body because the
//! provisional id has no relationship to the authoritative one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pawlink_bus::{EventHub, MessageChange, SubscriptionScope};
use pawlink_config::model::SyncConfig;
use pawlink_core::types::{
    ConversationId, ConversationView, Message, MessageId, OutgoingMessage, UserId,
};
use pawlink_core::{MessageSender, MessageStore, PawlinkError};

use crate::notify::NotificationPresenter;

/// States in the conversation session FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No conversation is open.
    Idle,
    /// A timeline load is in flight.
    Loading,
    /// The timeline is live and merging realtime arrivals.
    Ready,
    /// The load failed; a retry is available.
    Error,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Loading => write!(f, "loading"),
            SessionPhase::Ready => write!(f, "ready"),
            SessionPhase::Error => write!(f, "error"),
        }
    }
}

/// One entry in the open conversation's timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
    /// Locally sent, awaiting backend confirmation.
    Provisional(Message),
    /// Round-tripped through or observed from the authoritative store.
    Confirmed(Message),
}

impl TimelineEntry {
    /// The underlying message.
    pub fn message(&self) -> &Message {
        match self {
            TimelineEntry::Provisional(m) | TimelineEntry::Confirmed(m) => m,
        }
    }

    /// Whether this entry awaits confirmation.
    pub fn is_provisional(&self) -> bool {
        matches!(self, TimelineEntry::Provisional(_))
    }
}

/// Merge a confirmed arrival into the timeline.
///
/// Provisional entries matching the arrival's sender, recipient, and body
/// are discarded (superseded, not hidden); the arrival is inserted only if
/// its authoritative id is not already present, so duplicate delivery of
/// the same event is a no-op. The result is re-sorted ascending by
/// creation time.
pub fn reconcile_insert(mut entries: Vec<TimelineEntry>, incoming: Message) -> Vec<TimelineEntry> {
    entries.retain(|entry| match entry {
        TimelineEntry::Provisional(p) => {
            !(p.sender == incoming.sender
                && p.recipient == incoming.recipient
                && p.body == incoming.body)
        }
        TimelineEntry::Confirmed(_) => true,
    });

    if entries.iter().any(|e| e.message().id == incoming.id) {
        return entries;
    }

    entries.push(TimelineEntry::Confirmed(incoming));
    entries.sort_by(|a, b| a.message().created_at.cmp(&b.message().created_at));
    entries
}

/// Re-apply a provisional entry on top of a freshly loaded timeline,
/// unless a confirmed entry with matching content already supersedes it.
fn merge_provisional(mut entries: Vec<TimelineEntry>, provisional: Message) -> Vec<TimelineEntry> {
    let superseded = entries.iter().any(|entry| {
        matches!(entry, TimelineEntry::Confirmed(c)
            if c.sender == provisional.sender
                && c.recipient == provisional.recipient
                && c.body == provisional.body)
    });
    if superseded {
        return entries;
    }
    entries.push(TimelineEntry::Provisional(provisional));
    entries.sort_by(|a, b| a.message().created_at.cmp(&b.message().created_at));
    entries
}

struct SessionInner {
    phase: SessionPhase,
    open: Option<ConversationView>,
    timeline: Vec<TimelineEntry>,
    subscription: Option<CancellationToken>,
}

struct SessionShared {
    inner: Mutex<SessionInner>,
    /// Bumped on every open/close; ingest tasks and load results compare
    /// against their captured value and stand down when switched away.
    open_generation: AtomicU64,
    /// Bumped on every load attempt; an overlapping retry's slower result
    /// is discarded.
    load_generation: AtomicU64,
}

/// Owns the currently open conversation's live timeline.
pub struct ConversationSession {
    viewer: UserId,
    store: Arc<dyn MessageStore + Send + Sync>,
    sender: Arc<dyn MessageSender + Send + Sync>,
    hub: EventHub,
    presenter: Arc<NotificationPresenter>,
    config: SyncConfig,
    shared: Arc<SessionShared>,
}

impl ConversationSession {
    /// Create a session for the given viewer with no open conversation.
    pub fn new(
        viewer: UserId,
        store: Arc<dyn MessageStore + Send + Sync>,
        sender: Arc<dyn MessageSender + Send + Sync>,
        hub: EventHub,
        presenter: Arc<NotificationPresenter>,
        config: SyncConfig,
    ) -> Self {
        Self {
            viewer,
            store,
            sender,
            hub,
            presenter,
            config,
            shared: Arc::new(SessionShared {
                inner: Mutex::new(SessionInner {
                    phase: SessionPhase::Idle,
                    open: None,
                    timeline: Vec::new(),
                    subscription: None,
                }),
                open_generation: AtomicU64::new(0),
                load_generation: AtomicU64::new(0),
            }),
        }
    }

    /// The current FSM phase.
    pub async fn phase(&self) -> SessionPhase {
        self.shared.inner.lock().await.phase
    }

    /// Id of the open conversation, if any.
    pub async fn open_conversation(&self) -> Option<ConversationId> {
        self.shared
            .inner
            .lock()
            .await
            .open
            .as_ref()
            .map(|view| view.conversation.id.clone())
    }

    /// A point-in-time copy of the timeline.
    pub async fn timeline(&self) -> Vec<TimelineEntry> {
        self.shared.inner.lock().await.timeline.clone()
    }

    /// Open a conversation, cancelling any in-flight load for the previous
    /// one. Opening the already-Ready conversation is a no-op.
    pub async fn open(&self, view: ConversationView) -> Result<(), PawlinkError> {
        {
            let inner = self.shared.inner.lock().await;
            if inner.phase == SessionPhase::Ready
                && inner.open.as_ref().map(|o| &o.conversation.id)
                    == Some(&view.conversation.id)
            {
                debug!(conversation = %view.conversation.id, "already open, skipping reload");
                return Ok(());
            }
        }

        let open_generation = self.shared.open_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();

        {
            let mut inner = self.shared.inner.lock().await;
            if let Some(previous) = inner.subscription.take() {
                previous.cancel();
            }
            inner.subscription = Some(cancel.clone());
            inner.phase = SessionPhase::Loading;
            inner.open = Some(view.clone());
            inner.timeline.clear();
        }

        // Subscribe before loading so arrivals during the load merge into
        // the timeline instead of being lost; the id-dedup makes the
        // overlap with the query result safe.
        self.spawn_ingest(view.clone(), open_generation, cancel);
        debug!(conversation = %view.conversation.id, "conversation opened");

        self.load(open_generation).await
    }

    /// Retry a failed load for the currently open conversation.
    pub async fn retry(&self) -> Result<(), PawlinkError> {
        let open_generation = self.shared.open_generation.load(Ordering::SeqCst);
        {
            let mut inner = self.shared.inner.lock().await;
            if inner.phase != SessionPhase::Error {
                return Ok(());
            }
            inner.phase = SessionPhase::Loading;
        }
        self.load(open_generation).await
    }

    /// Send a message into the open conversation.
    ///
    /// The message appears immediately as a provisional entry; on backend
    /// failure it is removed and the error is surfaced, leaving the body
    /// with the caller for manual retry. On success, reconciliation with
    /// the confirmed row is left to the realtime path.
    pub async fn send(&self, body: &str) -> Result<(), PawlinkError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(PawlinkError::InvalidInput(
                "message body must not be empty".to_string(),
            ));
        }

        let (provisional_id, outgoing) = {
            let mut inner = self.shared.inner.lock().await;
            let Some(open) = &inner.open else {
                return Err(PawlinkError::InvalidInput(
                    "no conversation is open".to_string(),
                ));
            };

            let recipient = open.conversation.other_participant(&self.viewer).clone();
            let provisional = Message {
                id: MessageId::provisional(),
                sender: self.viewer.clone(),
                recipient: recipient.clone(),
                conversation_id: Some(open.conversation.id.clone()),
                context_id: open.conversation.context_id.clone(),
                body: trimmed.to_string(),
                created_at: Utc::now(),
                read: false,
                read_at: None,
            };
            let outgoing = OutgoingMessage {
                sender: self.viewer.clone(),
                recipient,
                context_id: open.conversation.context_id.clone(),
                body: trimmed.to_string(),
            };

            let id = provisional.id.clone();
            inner.timeline.push(TimelineEntry::Provisional(provisional));
            (id, outgoing)
        };

        match self.sender.send(outgoing).await {
            Ok(confirmed) => {
                debug!(message = %confirmed.id, "send confirmed");
                Ok(())
            }
            Err(e) => {
                let mut inner = self.shared.inner.lock().await;
                inner
                    .timeline
                    .retain(|entry| entry.message().id != provisional_id);
                warn!(error = %e, "send failed, provisional message removed");
                Err(e)
            }
        }
    }

    /// Close the open conversation, unsubscribing its realtime feed
    /// synchronously. No further events are applied to the timeline.
    pub async fn close(&self) {
        self.shared.open_generation.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.shared.inner.lock().await;
        if let Some(cancel) = inner.subscription.take() {
            cancel.cancel();
        }
        inner.phase = SessionPhase::Idle;
        inner.open = None;
        inner.timeline.clear();
        debug!("conversation closed");
    }

    /// Load the timeline for the open conversation, discarding the result
    /// if the conversation was switched or a newer load was initiated.
    async fn load(&self, open_generation: u64) -> Result<(), PawlinkError> {
        let (a, b) = {
            let inner = self.shared.inner.lock().await;
            let Some(open) = &inner.open else {
                return Ok(());
            };
            (
                open.conversation.participant_a.clone(),
                open.conversation.participant_b.clone(),
            )
        };

        let load_generation = self.shared.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.store.between(&a, &b).await;

        let mut inner = self.shared.inner.lock().await;
        if self.shared.open_generation.load(Ordering::SeqCst) != open_generation
            || self.shared.load_generation.load(Ordering::SeqCst) != load_generation
        {
            debug!("discarding load result for abandoned conversation");
            return Ok(());
        }

        match result {
            Ok(messages) => {
                // The query result is authoritative; entries that arrived
                // through the realtime feed or optimistic sends while the
                // query was in flight are re-applied on top.
                let overlay = std::mem::take(&mut inner.timeline);
                let mut fresh: Vec<TimelineEntry> =
                    messages.into_iter().map(TimelineEntry::Confirmed).collect();
                for entry in overlay {
                    fresh = match entry {
                        TimelineEntry::Confirmed(m) => reconcile_insert(fresh, m),
                        TimelineEntry::Provisional(p) => merge_provisional(fresh, p),
                    };
                }
                inner.timeline = fresh;
                inner.phase = SessionPhase::Ready;
                debug!(entries = inner.timeline.len(), "timeline loaded");
                Ok(())
            }
            Err(e) => {
                inner.phase = SessionPhase::Error;
                warn!(error = %e, "timeline load failed");
                Err(e)
            }
        }
    }

    /// Spawn the pair-scoped ingest task for the open conversation.
    fn spawn_ingest(&self, view: ConversationView, open_generation: u64, cancel: CancellationToken) {
        let mut subscription = self.hub.subscribe(SubscriptionScope::Pair(
            view.conversation.participant_a.clone(),
            view.conversation.participant_b.clone(),
        ));
        let shared = self.shared.clone();
        let store = self.store.clone();
        let presenter = self.presenter.clone();
        let viewer = self.viewer.clone();
        let read_delay = self.config.read_receipt_delay();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("conversation ingest stopped");
                        break;
                    }
                    change = subscription.recv() => {
                        let Some(change) = change else {
                            debug!("change feed closed, stopping conversation ingest");
                            break;
                        };
                        let MessageChange::Inserted { message } = change else {
                            continue;
                        };

                        {
                            let mut inner = shared.inner.lock().await;
                            if shared.open_generation.load(Ordering::SeqCst) != open_generation {
                                break;
                            }
                            let timeline = std::mem::take(&mut inner.timeline);
                            inner.timeline = reconcile_insert(timeline, message.clone());
                        }

                        if message.recipient == viewer && message.sender != viewer {
                            presenter.notify(&message, &view).await;

                            // Mark read after a short delay so the message
                            // is not flagged before the user has plausibly
                            // seen it; a torn-down session suppresses it.
                            let store = store.clone();
                            let viewer = viewer.clone();
                            let id = message.id.clone();
                            let cancel = cancel.clone();
                            tokio::spawn(async move {
                                tokio::select! {
                                    _ = cancel.cancelled() => {}
                                    _ = tokio::time::sleep(read_delay) => {
                                        match store.mark_message_read(&id, &viewer).await {
                                            Ok(_) => {
                                                debug!(message = %id, "incoming message marked read")
                                            }
                                            Err(e) => {
                                                warn!(error = %e, "delayed mark-read failed")
                                            }
                                        }
                                    }
                                }
                            });
                        }
                    }
                }
            }
        });
    }
}
