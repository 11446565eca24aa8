// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resettable coalescing timer for corrective reloads.
//!
//! Each trigger replaces any pending action, so a burst of realtime events
//! collapses into a single action fired one window after the last trigger.
//! The timer is bound to a [`CancellationToken`] and never fires against a
//! torn-down owner.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A resettable debounce window.
pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Debouncer {
    /// Create a debouncer with the given window, bound to `cancel`.
    pub fn new(window: Duration, cancel: CancellationToken) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
            cancel,
        }
    }

    /// Schedule `action` to run one window from now, replacing any pending
    /// action scheduled earlier.
    pub async fn trigger<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let window = self.window;
        let cancel = self.cancel.clone();
        *pending = Some(tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(window) => {
                    action().await;
                }
            }
        }));
    }

    /// Drop any pending action without running it.
    pub async fn cancel_pending(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }
}
