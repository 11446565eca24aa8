// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capture-only notification surface for assertions in tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use pawlink_core::types::{SystemNotification, ToastDescriptor};
use pawlink_core::{NotificationSurface, PawlinkError};

/// A mock notification surface.
///
/// Captures every toast and system notification for later assertion;
/// focus and permission are settable per test.
pub struct MockSurface {
    toasts: Mutex<Vec<ToastDescriptor>>,
    system: Mutex<Vec<SystemNotification>>,
    focused: AtomicBool,
    permission: AtomicBool,
}

impl MockSurface {
    /// Create a focused surface with permission granted.
    pub fn new() -> Self {
        Self {
            toasts: Mutex::new(Vec::new()),
            system: Mutex::new(Vec::new()),
            focused: AtomicBool::new(true),
            permission: AtomicBool::new(true),
        }
    }

    /// Set whether the viewport reports focus.
    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    /// Set whether system notification permission is granted.
    pub fn set_permission(&self, granted: bool) {
        self.permission.store(granted, Ordering::SeqCst);
    }

    /// All captured toasts.
    pub async fn toasts(&self) -> Vec<ToastDescriptor> {
        self.toasts.lock().await.clone()
    }

    /// All captured system notifications.
    pub async fn system_notifications(&self) -> Vec<SystemNotification> {
        self.system.lock().await.clone()
    }

    /// Count of captured toasts.
    pub async fn toast_count(&self) -> usize {
        self.toasts.lock().await.len()
    }
}

impl Default for MockSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSurface for MockSurface {
    async fn request_permission(&self) -> Result<bool, PawlinkError> {
        Ok(self.permission.load(Ordering::SeqCst))
    }

    async fn show_toast(&self, toast: &ToastDescriptor) -> Result<(), PawlinkError> {
        self.toasts.lock().await.push(toast.clone());
        Ok(())
    }

    async fn show_system(&self, note: &SystemNotification) -> Result<(), PawlinkError> {
        self.system.lock().await.push(note.clone());
        Ok(())
    }

    fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawlink_core::types::ConversationId;
    use std::time::Duration;

    #[tokio::test]
    async fn captures_toasts_in_order() {
        let surface = MockSurface::new();
        for n in 0..2 {
            surface
                .show_toast(&ToastDescriptor {
                    sender_name: format!("sender-{n}"),
                    body: "hi".into(),
                    conversation_id: ConversationId("c1".into()),
                    dismiss_after: Duration::from_secs(5),
                })
                .await
                .unwrap();
        }

        let toasts = surface.toasts().await;
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].sender_name, "sender-0");
        assert_eq!(toasts[1].sender_name, "sender-1");
    }

    #[tokio::test]
    async fn focus_and_permission_are_settable() {
        let surface = MockSurface::new();
        assert!(surface.is_focused());
        assert!(surface.request_permission().await.unwrap());

        surface.set_focused(false);
        surface.set_permission(false);
        assert!(!surface.is_focused());
        assert!(!surface.request_permission().await.unwrap());
    }
}
