// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store trait: the queryable relational surface the sync core
//! consumes for messages, conversations, and read-state mutations.

use async_trait::async_trait;

use crate::error::PawlinkError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{
    Conversation, ConversationId, ConversationRecord, Message, MessageId, Profile, UserId,
};

/// Adapter for the relational message store.
///
/// All read-state mutations are constrained to unread rows addressed to the
/// given recipient and return the number of rows they actually changed, so
/// overlapping predicates stay idempotent.
#[async_trait]
pub trait MessageStore: ServiceAdapter {
    /// Initializes the store backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), PawlinkError>;

    /// Closes the store backend, flushing pending writes.
    async fn close(&self) -> Result<(), PawlinkError>;

    // --- Message queries ---

    /// All unread messages addressed to `recipient`, newest first.
    async fn unread_for(&self, recipient: &UserId) -> Result<Vec<Message>, PawlinkError>;

    /// All messages between the two participants, ascending by creation time.
    async fn between(&self, a: &UserId, b: &UserId) -> Result<Vec<Message>, PawlinkError>;

    /// Insert a confirmed message row.
    async fn insert_message(&self, message: &Message) -> Result<(), PawlinkError>;

    // --- Read-state mutations ---

    /// Mark unread messages in a conversation, addressed to `recipient`, read.
    async fn mark_conversation_read(
        &self,
        conversation: &ConversationId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError>;

    /// Mark unread messages from `sender` to `recipient` read.
    ///
    /// Covers legacy rows that carry no conversation id and are only
    /// addressable by their participant pair.
    async fn mark_sender_read(
        &self,
        sender: &UserId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError>;

    /// Mark one specific message read, if it is addressed to `recipient`.
    async fn mark_message_read(
        &self,
        id: &MessageId,
        recipient: &UserId,
    ) -> Result<u64, PawlinkError>;

    /// Mark every unread message addressed to `recipient` read.
    async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, PawlinkError>;

    // --- Conversations and profiles ---

    /// Find the conversation pairing the two participants, if any.
    async fn conversation_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, PawlinkError>;

    /// All conversations involving `viewer` with both participant profiles,
    /// most recent activity first.
    async fn conversations_for(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<ConversationRecord>, PawlinkError>;

    /// Insert or replace a profile row.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), PawlinkError>;

    /// Look up a profile by id.
    async fn profile(&self, id: &UserId) -> Result<Option<Profile>, PawlinkError>;
}
