// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity watching: session transitions drive unread tracker resets.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use pawlink_core::types::UserId;
use pawlink_core::IdentityProvider;

use crate::unread::UnreadTracker;

/// A local, watch-channel-backed identity provider.
///
/// Stands in for the hosted auth provider's session stream in the demo
/// binary and in tests.
pub struct SessionHandle {
    tx: watch::Sender<Option<UserId>>,
}

impl SessionHandle {
    /// Create a handle with the given initial identity.
    pub fn new(initial: Option<UserId>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Transition to a signed-in identity.
    pub fn sign_in(&self, user: UserId) {
        self.tx.send_replace(Some(user));
    }

    /// Transition to signed-out.
    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl IdentityProvider for SessionHandle {
    fn current(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}

/// Spawn a task that forwards identity transitions into the tracker.
///
/// The tracker is initialized once with the current identity, then again on
/// every transition (sign-in, sign-out, identity swap) until the provider
/// is dropped or the token is cancelled.
pub fn spawn_identity_watcher(
    tracker: Arc<UnreadTracker>,
    provider: &dyn IdentityProvider,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = provider.watch();

    tokio::spawn(async move {
        let current = rx.borrow_and_update().clone();
        tracker.initialize(current).await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("identity watcher stopped");
                    break;
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        debug!("identity provider dropped, stopping watcher");
                        break;
                    }
                    let identity = rx.borrow_and_update().clone();
                    tracker.initialize(identity).await;
                }
            }
        }
    })
}
