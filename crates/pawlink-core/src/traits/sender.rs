// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send endpoint trait: the backend call a client makes to deliver a message.
//!
//! Sending goes through this seam rather than the store directly; the
//! implementation resolves or creates the conversation, assigns the
//! authoritative id, and feeds the change into the realtime path.

use async_trait::async_trait;

use crate::error::PawlinkError;
use crate::types::{Message, OutgoingMessage};

/// Adapter for outbound message delivery.
#[async_trait]
pub trait MessageSender: Send + Sync + 'static {
    /// Deliver an outgoing message, returning the confirmed row on success.
    ///
    /// Callers must not assume the returned row is the only confirmation
    /// path: the realtime feed may announce the same insert, and the two
    /// must reconcile idempotently.
    async fn send(&self, outgoing: OutgoingMessage) -> Result<Message, PawlinkError>;
}
