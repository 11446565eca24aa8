// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity provider trait: signed-in identity plus a session change stream.

use tokio::sync::watch;

use crate::types::UserId;

/// Adapter for the session/identity provider.
///
/// Identity transitions (sign-in, sign-out, identity swap) are full reset
/// events for the unread tracker; consumers subscribe once at startup and
/// react to the watch stream rather than polling.
pub trait IdentityProvider: Send + Sync + 'static {
    /// The currently signed-in identity, if any.
    fn current(&self) -> Option<UserId>;

    /// A stream of identity transitions. The receiver yields the current
    /// value immediately on first borrow.
    fn watch(&self) -> watch::Receiver<Option<UserId>>;
}
