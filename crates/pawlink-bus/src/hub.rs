// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast hub fanning message changes out to scoped subscriptions.
//!
//! The hub mirrors the push contract of a hosted change feed: every
//! subscription independently observes every change whose row matches its
//! scope, with no ordering guarantee across subscriptions. A slow consumer
//! that falls behind the buffer loses the oldest events (logged), which the
//! sync core tolerates because its reloads are authoritative and replacing.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::event::{MessageChange, SubscriptionScope};

/// Fan-out hub for message change notifications.
///
/// Cloning the hub is cheap; all clones publish into the same feed.
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<MessageChange>,
}

impl EventHub {
    /// Create a hub whose subscriptions buffer up to `capacity` undelivered
    /// changes each.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a change to every live subscription.
    ///
    /// Publishing with no subscribers is not an error; the change is simply
    /// dropped.
    pub fn publish(&self, change: MessageChange) {
        match self.tx.send(change) {
            Ok(receivers) => {
                debug!(receivers, "message change published");
            }
            Err(_) => {
                debug!("message change dropped, no live subscriptions");
            }
        }
    }

    /// Open a subscription scoped to the given row predicate.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes immediately.
    pub fn subscribe(&self, scope: SubscriptionScope) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            scope,
        }
    }

    /// Number of currently open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(256)
    }
}

/// A live, scope-filtered subscription to the hub.
pub struct Subscription {
    rx: broadcast::Receiver<MessageChange>,
    scope: SubscriptionScope,
}

impl Subscription {
    /// Receive the next change matching this subscription's scope.
    ///
    /// Changes outside the scope are silently skipped. Returns `None` once
    /// the hub and all its clones have been dropped.
    pub async fn recv(&mut self) -> Option<MessageChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => {
                    if self.scope.matches(change.message()) {
                        return Some(change);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscription lagged, changes lost");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The row predicate this subscription is scoped to.
    pub fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pawlink_core::types::{Message, MessageId, UserId};

    fn user(id: &str) -> UserId {
        UserId(id.to_string())
    }

    fn insert(sender: &str, recipient: &str) -> MessageChange {
        MessageChange::Inserted {
            message: Message {
                id: MessageId(uuid::Uuid::new_v4().to_string()),
                sender: user(sender),
                recipient: user(recipient),
                conversation_id: None,
                context_id: None,
                body: "hi".to_string(),
                created_at: Utc::now(),
                read: false,
                read_at: None,
            },
        }
    }

    #[tokio::test]
    async fn subscription_receives_matching_changes() {
        let hub = EventHub::new(16);
        let mut sub = hub.subscribe(SubscriptionScope::Viewer(user("alice")));

        hub.publish(insert("bob", "alice"));

        let change = sub.recv().await.expect("change should arrive");
        assert_eq!(change.message().recipient, user("alice"));
    }

    #[tokio::test]
    async fn subscription_filters_out_of_scope_changes() {
        let hub = EventHub::new(16);
        let mut sub = hub.subscribe(SubscriptionScope::Pair(user("alice"), user("bob")));

        // Out of scope, then in scope. Only the second must surface.
        hub.publish(insert("carol", "dave"));
        hub.publish(insert("alice", "bob"));

        let change = sub.recv().await.expect("pair change should arrive");
        assert!(change.message().between_pair(&user("alice"), &user("bob")));
    }

    #[tokio::test]
    async fn two_subscriptions_both_observe_the_same_insert() {
        let hub = EventHub::new(16);
        let mut viewer_sub = hub.subscribe(SubscriptionScope::Viewer(user("alice")));
        let mut pair_sub = hub.subscribe(SubscriptionScope::Pair(user("alice"), user("bob")));

        hub.publish(insert("bob", "alice"));

        let seen_by_viewer = viewer_sub.recv().await.expect("viewer sees the insert");
        let seen_by_pair = pair_sub.recv().await.expect("pair sees the insert");
        assert_eq!(seen_by_viewer, seen_by_pair);
    }

    #[tokio::test]
    async fn recv_returns_none_after_hub_dropped() {
        let hub = EventHub::new(16);
        let mut sub = hub.subscribe(SubscriptionScope::Viewer(user("alice")));
        drop(hub);

        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let hub = EventHub::new(16);
        let sub = hub.subscribe(SubscriptionScope::Viewer(user("alice")));
        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let hub = EventHub::new(16);
        // Must not panic or error.
        hub.publish(insert("a", "b"));
    }
}
