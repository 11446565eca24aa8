// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification surface trait: toast and system-level notification delivery.

use async_trait::async_trait;

use crate::error::PawlinkError;
use crate::types::{SystemNotification, ToastDescriptor};

/// Adapter for the host notification surface.
///
/// Implementations degrade gracefully: a denied permission or missing
/// surface is reported as an error the presenter logs and swallows, never
/// as a user-visible failure.
#[async_trait]
pub trait NotificationSurface: Send + Sync + 'static {
    /// Request permission to show system notifications. Returns whether
    /// permission is granted; implementations should cache the outcome.
    async fn request_permission(&self) -> Result<bool, PawlinkError>;

    /// Show a transient in-app toast.
    async fn show_toast(&self, toast: &ToastDescriptor) -> Result<(), PawlinkError>;

    /// Show a system-level notification with a deep link target.
    async fn show_system(&self, note: &SystemNotification) -> Result<(), PawlinkError>;

    /// Whether the viewport currently has focus. System notifications are
    /// only emitted when it does not.
    fn is_focused(&self) -> bool;
}
