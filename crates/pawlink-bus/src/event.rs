// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notification payloads for the message table.

use serde::{Deserialize, Serialize};

use pawlink_core::types::{Message, UserId};

/// A row-level change notification for a message.
///
/// Delivery is at-least-once and unordered across independent
/// subscriptions; every consumer must absorb duplicates idempotently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageChange {
    /// A new message row was inserted.
    Inserted {
        message: Message,
    },
    /// An existing message row was updated. `was_read` carries the read
    /// flag before the update so consumers can detect false -> true
    /// transitions.
    Updated {
        message: Message,
        was_read: bool,
    },
}

impl MessageChange {
    /// The message row after the change.
    pub fn message(&self) -> &Message {
        match self {
            MessageChange::Inserted { message } => message,
            MessageChange::Updated { message, .. } => message,
        }
    }

    /// Whether this change is a read-flag transition from unread to read.
    pub fn is_read_transition(&self) -> bool {
        match self {
            MessageChange::Inserted { .. } => false,
            MessageChange::Updated { message, was_read } => message.read && !was_read,
        }
    }
}

/// Row-level predicate a subscription is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionScope {
    /// All messages the viewer sends or receives.
    Viewer(UserId),
    /// All messages between the two participants, in either direction.
    Pair(UserId, UserId),
}

impl SubscriptionScope {
    /// Whether a message row falls inside this scope.
    pub fn matches(&self, message: &Message) -> bool {
        match self {
            SubscriptionScope::Viewer(viewer) => {
                message.sender == *viewer || message.recipient == *viewer
            }
            SubscriptionScope::Pair(a, b) => message.between_pair(a, b),
        }
    }
}
