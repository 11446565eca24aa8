// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the service seams the sync core consumes.

pub mod adapter;
pub mod identity;
pub mod notify;
pub mod sender;
pub mod store;

pub use adapter::ServiceAdapter;
pub use identity::IdentityProvider;
pub use notify::NotificationSurface;
pub use sender::MessageSender;
pub use store::MessageStore;
