// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Pawlink messaging sync core.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Pawlink workspace. The store, event
//! feed, identity, and notification collaborators all implement traits
//! defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PawlinkError;
pub use types::{
    AdapterKind, ContextId, Conversation, ConversationId, ConversationRecord, ConversationView,
    HealthStatus, Message, MessageId, OutgoingMessage, Profile, SystemNotification,
    ToastDescriptor, UserId,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    IdentityProvider, MessageSender, MessageStore, NotificationSurface, ServiceAdapter,
};
