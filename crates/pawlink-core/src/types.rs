// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Pawlink sync core.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Prefix carried by client-generated provisional message ids.
const PROVISIONAL_PREFIX: &str = "temp-";

/// Unique identifier for a signed-in user or profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a conversation between two participants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message.
///
/// Authoritative ids are assigned by the store. Provisional ids are generated
/// client-side for optimistic sends and carry a `temp-` prefix so the two can
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a fresh provisional id for an optimistic, unconfirmed send.
    pub fn provisional() -> Self {
        MessageId(format!("{PROVISIONAL_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    /// Whether this id was generated client-side and awaits confirmation.
    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_PREFIX)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the availability post a conversation originated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub String);

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a service seam.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterKind {
    Store,
    Events,
    Identity,
    Notification,
}

/// A single message row.
///
/// Immutable once confirmed; the only mutable fields are the read flag and
/// its timestamp. `conversation_id` is nullable because legacy rows predate
/// the conversations table and can only be addressed by their sender and
/// recipient pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: UserId,
    pub recipient: UserId,
    pub conversation_id: Option<ConversationId>,
    pub context_id: Option<ContextId>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Whether this message travels between exactly the two given participants,
    /// in either direction.
    pub fn between_pair(&self, a: &UserId, b: &UserId) -> bool {
        (self.sender == *a && self.recipient == *b)
            || (self.sender == *b && self.recipient == *a)
    }
}

/// A conversation pairing two identities around an optional originating post.
///
/// Conversations are created by the store on first message exchange; the sync
/// core only reads and re-ranks them by last activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_a: UserId,
    pub participant_b: UserId,
    pub context_id: Option<ContextId>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Conversation {
    /// The participant that is not the viewer.
    ///
    /// Falls back to `participant_b` when the viewer is not part of the
    /// conversation at all, matching the resolution used for mark-read
    /// predicates.
    pub fn other_participant(&self, viewer: &UserId) -> &UserId {
        if self.participant_a == *viewer {
            &self.participant_b
        } else {
            &self.participant_a
        }
    }

    /// Whether the given user is one of the two participants.
    pub fn involves(&self, user: &UserId) -> bool {
        self.participant_a == *user || self.participant_b == *user
    }
}

/// A user profile, as joined into conversation listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Profile {
    /// Human-readable display name: "first last" trimmed, or a placeholder
    /// when both parts are missing.
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            "Unknown user".to_string()
        } else {
            name.to_string()
        }
    }
}

/// A conversation with both participant profiles, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub conversation: Conversation,
    pub profile_a: Profile,
    pub profile_b: Profile,
}

/// Viewer-relative projection of a conversation for presentation.
///
/// Derived at read time and never stored: the "other" side, its display
/// name, and the unread count supplied by the caller's aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    pub conversation: Conversation,
    pub other: Profile,
    pub display_name: String,
    pub unread: u64,
}

impl ConversationView {
    /// Project a store record relative to the viewer.
    pub fn project(record: ConversationRecord, viewer: &UserId, unread: u64) -> Self {
        let other = if record.conversation.participant_a == *viewer {
            record.profile_b
        } else {
            record.profile_a
        };
        let display_name = other.display_name();
        ConversationView {
            conversation: record.conversation,
            other,
            display_name,
            unread,
        }
    }
}

/// Input to the send endpoint: a new message addressed to a recipient,
/// optionally tied to the availability post it responds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub sender: UserId,
    pub recipient: UserId,
    pub context_id: Option<ContextId>,
    pub body: String,
}

/// A transient in-app notification for an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastDescriptor {
    pub sender_name: String,
    pub body: String,
    pub conversation_id: ConversationId,
    pub dismiss_after: Duration,
}

/// A system-level notification request with a deep link back into the
/// conversation. Emitted only when the viewport is not focused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemNotification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub tag: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId(id.to_string())
    }

    #[test]
    fn provisional_ids_are_marked_and_unique() {
        let a = MessageId::provisional();
        let b = MessageId::provisional();
        assert!(a.is_provisional());
        assert!(b.is_provisional());
        assert_ne!(a, b);
    }

    #[test]
    fn authoritative_id_is_not_provisional() {
        let id = MessageId(uuid::Uuid::new_v4().to_string());
        assert!(!id.is_provisional());
    }

    #[test]
    fn message_between_pair_is_direction_agnostic() {
        let msg = Message {
            id: MessageId("m1".into()),
            sender: user("alice"),
            recipient: user("bob"),
            conversation_id: None,
            context_id: None,
            body: "hello".into(),
            created_at: Utc::now(),
            read: false,
            read_at: None,
        };
        assert!(msg.between_pair(&user("alice"), &user("bob")));
        assert!(msg.between_pair(&user("bob"), &user("alice")));
        assert!(!msg.between_pair(&user("alice"), &user("carol")));
    }

    #[test]
    fn other_participant_resolution() {
        let conv = Conversation {
            id: ConversationId("c1".into()),
            participant_a: user("alice"),
            participant_b: user("bob"),
            context_id: None,
            created_at: Utc::now(),
            last_activity: Utc::now(),
        };
        assert_eq!(conv.other_participant(&user("alice")), &user("bob"));
        assert_eq!(conv.other_participant(&user("bob")), &user("alice"));
        // A non-participant viewer resolves to participant_b, mirroring the
        // mark-read predicate resolution.
        assert_eq!(conv.other_participant(&user("carol")), &user("bob"));
        assert!(conv.involves(&user("alice")));
        assert!(!conv.involves(&user("carol")));
    }

    #[test]
    fn display_name_falls_back_when_empty() {
        let full = Profile {
            id: user("u1"),
            first_name: Some("Dana".into()),
            last_name: Some("Kim".into()),
            photo_url: None,
        };
        assert_eq!(full.display_name(), "Dana Kim");

        let first_only = Profile {
            id: user("u2"),
            first_name: Some("Dana".into()),
            last_name: None,
            photo_url: None,
        };
        assert_eq!(first_only.display_name(), "Dana");

        let empty = Profile {
            id: user("u3"),
            first_name: None,
            last_name: Some("   ".into()),
            photo_url: None,
        };
        assert_eq!(empty.display_name(), "Unknown user");
    }

    #[test]
    fn conversation_view_projects_relative_to_viewer() {
        let record = ConversationRecord {
            conversation: Conversation {
                id: ConversationId("c1".into()),
                participant_a: user("alice"),
                participant_b: user("bob"),
                context_id: None,
                created_at: Utc::now(),
                last_activity: Utc::now(),
            },
            profile_a: Profile {
                id: user("alice"),
                first_name: Some("Alice".into()),
                last_name: None,
                photo_url: None,
            },
            profile_b: Profile {
                id: user("bob"),
                first_name: Some("Bob".into()),
                last_name: Some("Lee".into()),
                photo_url: None,
            },
        };

        let view = ConversationView::project(record.clone(), &user("alice"), 3);
        assert_eq!(view.other.id, user("bob"));
        assert_eq!(view.display_name, "Bob Lee");
        assert_eq!(view.unread, 3);

        let view = ConversationView::project(record, &user("bob"), 0);
        assert_eq!(view.other.id, user("alice"));
        assert_eq!(view.display_name, "Alice");
    }

    #[test]
    fn adapter_kind_round_trips() {
        use std::str::FromStr;
        for kind in [
            AdapterKind::Store,
            AdapterKind::Events,
            AdapterKind::Identity,
            AdapterKind::Notification,
        ] {
            let s = kind.to_string();
            let parsed = AdapterKind::from_str(&s).expect("should parse back");
            assert_eq!(kind, parsed);
        }
    }
}
