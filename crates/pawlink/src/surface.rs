// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal notification surface for the demo.

use async_trait::async_trait;

use pawlink_core::types::{SystemNotification, ToastDescriptor};
use pawlink_core::{NotificationSurface, PawlinkError};

/// Prints toasts and system notifications to stdout.
///
/// Reports the viewport as unfocused so the demo exercises the system
/// notification path as well.
pub struct TerminalSurface;

#[async_trait]
impl NotificationSurface for TerminalSurface {
    async fn request_permission(&self) -> Result<bool, PawlinkError> {
        Ok(true)
    }

    async fn show_toast(&self, toast: &ToastDescriptor) -> Result<(), PawlinkError> {
        println!(
            "  [toast] {}: {} (dismisses in {:?})",
            toast.sender_name, toast.body, toast.dismiss_after
        );
        Ok(())
    }

    async fn show_system(&self, note: &SystemNotification) -> Result<(), PawlinkError> {
        println!("  [system] {} -- {} -> {}", note.title, note.body, note.link);
        Ok(())
    }

    fn is_focused(&self) -> bool {
        false
    }
}
