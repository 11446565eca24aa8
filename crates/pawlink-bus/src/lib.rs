// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process realtime change feed for the Pawlink messaging sync core.
//!
//! Plays the role of the hosted platform's row-level change feed: the store
//! publishes INSERT/UPDATE notifications for message rows into an
//! [`EventHub`], and consumers open [`Subscription`]s scoped either to one
//! viewer's messages or to a conversation's participant pair. Delivery is
//! push-based, at-least-once, and unordered across independent
//! subscriptions.

pub mod event;
pub mod hub;

pub use event::{MessageChange, SubscriptionScope};
pub use hub::{EventHub, Subscription};
