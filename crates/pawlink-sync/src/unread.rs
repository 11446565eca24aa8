// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unread-count tracking with optimistic updates and authoritative reloads.
//!
//! The [`UnreadTracker`] keeps the viewer's unread counts accurate and
//! responsive with minimal store round-trips:
//! - **Authoritative reload**: a full replace-not-merge refresh, guarded by
//!   a monotonically increasing request token so the most recently
//!   *initiated* reload wins over slower stale ones.
//! - **Optimistic math**: realtime inserts bump counts immediately and
//!   read transitions decrement them (clamped at zero), with a debounced
//!   reload correcting any drift.
//! - **Dual-predicate mark-read**: both the conversation-id filter and the
//!   participant filter are attempted, because legacy rows lack a
//!   conversation id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pawlink_bus::{EventHub, MessageChange, SubscriptionScope};
use pawlink_config::model::SyncConfig;
use pawlink_core::types::{ConversationId, Message, UserId};
use pawlink_core::MessageStore;

use crate::debounce::Debouncer;

/// In-memory aggregate of unread counts for one viewer.
///
/// Owned exclusively by [`UnreadTracker`]; presentational consumers read
/// clones via [`UnreadTracker::snapshot`] and never mutate counts directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnreadAggregate {
    /// Total unread messages addressed to the viewer.
    pub total: u64,
    /// Per-conversation unread counts. Entries at zero are removed.
    /// Legacy rows without a conversation id count toward `total` only.
    pub by_conversation: HashMap<ConversationId, u64>,
    /// When the aggregate was last refreshed from the store.
    pub last_refresh: Option<DateTime<Utc>>,
}

impl UnreadAggregate {
    /// Build an aggregate from an authoritative unread query result.
    pub fn from_messages(messages: &[Message], refreshed_at: DateTime<Utc>) -> Self {
        let mut by_conversation: HashMap<ConversationId, u64> = HashMap::new();
        for msg in messages {
            if let Some(conversation) = &msg.conversation_id {
                *by_conversation.entry(conversation.clone()).or_insert(0) += 1;
            }
        }
        Self {
            total: messages.len() as u64,
            by_conversation,
            last_refresh: Some(refreshed_at),
        }
    }

    /// Unread count for one conversation.
    pub fn unread_in(&self, conversation: &ConversationId) -> u64 {
        self.by_conversation.get(conversation).copied().unwrap_or(0)
    }

    /// Whether any unread messages remain.
    pub fn has_unread(&self) -> bool {
        self.total > 0
    }

    /// Optimistically count one newly inserted unread message.
    fn apply_insert(&mut self, conversation: Option<&ConversationId>) {
        self.total += 1;
        if let Some(conversation) = conversation {
            *self.by_conversation.entry(conversation.clone()).or_insert(0) += 1;
        }
    }

    /// Optimistically count one message transitioning unread -> read.
    /// Clamped at zero; zero entries are removed.
    fn apply_read(&mut self, conversation: Option<&ConversationId>) {
        self.total = self.total.saturating_sub(1);
        if let Some(conversation) = conversation
            && let Some(count) = self.by_conversation.get_mut(conversation)
        {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.by_conversation.remove(conversation);
            }
        }
    }
}

/// First-settle welcome state: unread total captured by the first
/// successful reload after sign-in, consumed once by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WelcomeGate {
    Waiting,
    Ready(u64),
    Consumed,
}

struct TrackerState {
    viewer: Mutex<Option<UserId>>,
    aggregate: Mutex<UnreadAggregate>,
    welcome: Mutex<WelcomeGate>,
    /// Token of the most recently initiated reload. Responses whose token
    /// is no longer the latest are discarded.
    reload_token: AtomicU64,
    subscription: Mutex<Option<CancellationToken>>,
}

/// Maintains the viewer's unread aggregate for the lifetime of a session.
///
/// Initialized once per signed-in identity; identity transitions are full
/// reset events. The tracker subscribes to the viewer-scoped change feed
/// and tolerates observing the same event as other subscriptions.
pub struct UnreadTracker {
    store: Arc<dyn MessageStore + Send + Sync>,
    hub: EventHub,
    config: SyncConfig,
    state: Arc<TrackerState>,
}

impl UnreadTracker {
    /// Create a tracker with no signed-in identity.
    pub fn new(
        store: Arc<dyn MessageStore + Send + Sync>,
        hub: EventHub,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            hub,
            config,
            state: Arc::new(TrackerState {
                viewer: Mutex::new(None),
                aggregate: Mutex::new(UnreadAggregate::default()),
                welcome: Mutex::new(WelcomeGate::Waiting),
                reload_token: AtomicU64::new(0),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// React to an identity transition.
    ///
    /// `Some(user)`: subscribe and perform a full reload. Re-initializing
    /// with the same identity is a no-op beyond a fresh reload.
    /// `None`: reset the aggregate and stop the subscription.
    pub async fn initialize(&self, identity: Option<UserId>) {
        // Invalidate any in-flight reload for the previous identity.
        self.state.reload_token.fetch_add(1, Ordering::SeqCst);

        match identity {
            None => {
                *self.state.viewer.lock().await = None;
                self.stop_subscription().await;
                *self.state.aggregate.lock().await = UnreadAggregate::default();
                *self.state.welcome.lock().await = WelcomeGate::Waiting;
                info!("unread tracker reset, signed out");
            }
            Some(user) => {
                let same_identity = {
                    let mut viewer = self.state.viewer.lock().await;
                    let same = viewer.as_ref() == Some(&user);
                    *viewer = Some(user.clone());
                    same
                };

                if !same_identity {
                    self.stop_subscription().await;
                    *self.state.aggregate.lock().await = UnreadAggregate::default();
                    *self.state.welcome.lock().await = WelcomeGate::Waiting;

                    let cancel = CancellationToken::new();
                    *self.state.subscription.lock().await = Some(cancel.clone());
                    spawn_ingest(
                        self.store.clone(),
                        self.state.clone(),
                        &self.hub,
                        user.clone(),
                        &self.config,
                        cancel,
                    );
                    info!(viewer = %user, "unread tracker initialized");
                }

                reload_aggregate(&self.store, &self.state, &user).await;
            }
        }
    }

    /// Perform an authoritative reload for the current identity.
    ///
    /// Store failures are logged and leave the last good aggregate intact;
    /// a reload either fully replaces the aggregate or fully no-ops.
    pub async fn reload(&self) {
        let viewer = self.state.viewer.lock().await.clone();
        if let Some(viewer) = viewer {
            reload_aggregate(&self.store, &self.state, &viewer).await;
        }
    }

    /// Mark every unread message in a conversation read, then reload.
    ///
    /// Both predicates are attempted: the conversation-id filter misses
    /// legacy rows that carry no conversation id, so the resolved other
    /// participant covers them. Individual mutation failures are logged,
    /// not surfaced; the reload self-corrects the visible count.
    pub async fn mark_conversation_read(
        &self,
        conversation: &ConversationId,
        participant_a: &UserId,
        participant_b: &UserId,
    ) {
        let Some(viewer) = self.state.viewer.lock().await.clone() else {
            debug!("mark conversation read skipped, no signed-in identity");
            return;
        };

        let other = if *participant_a == viewer {
            participant_b
        } else {
            participant_a
        };

        match self.store.mark_conversation_read(conversation, &viewer).await {
            Ok(marked) => {
                debug!(marked, conversation = %conversation, "marked read by conversation")
            }
            Err(e) => warn!(error = %e, "mark read by conversation failed"),
        }

        match self.store.mark_sender_read(other, &viewer).await {
            Ok(marked) => debug!(marked, sender = %other, "marked read by participant"),
            Err(e) => warn!(error = %e, "mark read by participant failed"),
        }

        reload_aggregate(&self.store, &self.state, &viewer).await;
    }

    /// Mark every unread message addressed to the viewer read.
    ///
    /// The predicate is unconditional, so on success the empty aggregate is
    /// authoritative without a reload.
    pub async fn mark_all_read(&self) {
        let Some(viewer) = self.state.viewer.lock().await.clone() else {
            return;
        };

        match self.store.mark_all_read(&viewer).await {
            Ok(marked) => {
                // Discard any in-flight reload initiated before the mark.
                self.state.reload_token.fetch_add(1, Ordering::SeqCst);
                *self.state.aggregate.lock().await = UnreadAggregate {
                    total: 0,
                    by_conversation: HashMap::new(),
                    last_refresh: Some(Utc::now()),
                };
                debug!(marked, "all messages marked read");
            }
            Err(e) => warn!(error = %e, "mark all read failed"),
        }
    }

    /// A point-in-time copy of the aggregate.
    pub async fn snapshot(&self) -> UnreadAggregate {
        self.state.aggregate.lock().await.clone()
    }

    /// One-shot unread total from the first settled reload after sign-in,
    /// for a welcome notification. Returns `None` once consumed or when
    /// nothing was unread.
    pub async fn take_welcome_unread(&self) -> Option<u64> {
        let mut welcome = self.state.welcome.lock().await;
        match *welcome {
            WelcomeGate::Ready(total) => {
                *welcome = WelcomeGate::Consumed;
                if total > 0 { Some(total) } else { None }
            }
            _ => None,
        }
    }

    /// Stop the realtime subscription and any pending debounced reloads.
    pub async fn shutdown(&self) {
        self.stop_subscription().await;
    }

    async fn stop_subscription(&self) {
        if let Some(cancel) = self.state.subscription.lock().await.take() {
            cancel.cancel();
        }
    }
}

/// Authoritative reload with last-initiated-wins semantics.
async fn reload_aggregate(
    store: &Arc<dyn MessageStore + Send + Sync>,
    state: &Arc<TrackerState>,
    viewer: &UserId,
) {
    let token = state.reload_token.fetch_add(1, Ordering::SeqCst) + 1;

    match store.unread_for(viewer).await {
        Ok(messages) => {
            let fresh = UnreadAggregate::from_messages(&messages, Utc::now());
            let total = fresh.total;

            {
                let mut aggregate = state.aggregate.lock().await;
                if state.reload_token.load(Ordering::SeqCst) != token {
                    debug!("discarding superseded reload result");
                    return;
                }
                *aggregate = fresh;
            }

            let mut welcome = state.welcome.lock().await;
            if *welcome == WelcomeGate::Waiting {
                *welcome = WelcomeGate::Ready(total);
            }

            debug!(total, "unread aggregate reloaded");
        }
        Err(e) => {
            warn!(error = %e, "unread reload failed, keeping last good aggregate");
        }
    }
}

/// Spawn the viewer-scoped ingest task: optimistic count updates plus
/// debounced corrective reloads, torn down via the cancellation token.
fn spawn_ingest(
    store: Arc<dyn MessageStore + Send + Sync>,
    state: Arc<TrackerState>,
    hub: &EventHub,
    viewer: UserId,
    config: &SyncConfig,
    cancel: CancellationToken,
) {
    let mut subscription = hub.subscribe(SubscriptionScope::Viewer(viewer.clone()));
    let insert_debounce = Debouncer::new(config.insert_debounce(), cancel.clone());
    let update_debounce = Debouncer::new(config.update_debounce(), cancel.clone());

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("unread ingest stopped");
                    break;
                }
                change = subscription.recv() => {
                    let Some(change) = change else {
                        debug!("change feed closed, stopping unread ingest");
                        break;
                    };
                    match change {
                        MessageChange::Inserted { message }
                            if message.recipient == viewer && !message.read =>
                        {
                            state
                                .aggregate
                                .lock()
                                .await
                                .apply_insert(message.conversation_id.as_ref());

                            let store = store.clone();
                            let state = state.clone();
                            let viewer = viewer.clone();
                            insert_debounce
                                .trigger(move || async move {
                                    reload_aggregate(&store, &state, &viewer).await;
                                })
                                .await;
                        }
                        MessageChange::Updated { ref message, was_read }
                            if message.read && !was_read && message.recipient == viewer =>
                        {
                            state
                                .aggregate
                                .lock()
                                .await
                                .apply_read(message.conversation_id.as_ref());

                            let store = store.clone();
                            let state = state.clone();
                            let viewer = viewer.clone();
                            update_debounce
                                .trigger(move || async move {
                                    reload_aggregate(&store, &state, &viewer).await;
                                })
                                .await;
                        }
                        // Events for other recipients or already-read rows
                        // carry no count change.
                        _ => {}
                    }
                }
            }
        }
    });
}
