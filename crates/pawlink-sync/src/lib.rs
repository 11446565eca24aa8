// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime unread-count and conversation-state reconciliation core.
//!
//! Three components cooperate without a single coordinating server
//! process, each tolerating at-least-once, unordered event delivery:
//! - [`UnreadTracker`]: the viewer's unread aggregate, reconciled through
//!   optimistic updates and authoritative, last-initiated-wins reloads.
//! - [`ConversationSession`]: the open conversation's live timeline,
//!   merging provisional sends with realtime-confirmed arrivals.
//! - [`NotificationPresenter`]: toast/system notification decisions with
//!   duplicate suppression across overlapping subscriptions.

pub mod debounce;
pub mod identity;
pub mod notify;
pub mod session;
pub mod unread;

pub use debounce::Debouncer;
pub use identity::{spawn_identity_watcher, SessionHandle};
pub use notify::NotificationPresenter;
pub use session::{reconcile_insert, ConversationSession, SessionPhase, TimelineEntry};
pub use unread::{UnreadAggregate, UnreadTracker};
