// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification presenter with duplicate suppression.
//!
//! The same insert can be observed by both the per-conversation feed and
//! the viewer-wide sidebar feed; suppression is a single most-recent-id
//! check, which is narrow but sufficient for that overlap.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use pawlink_config::model::NotifyConfig;
use pawlink_core::types::{ConversationView, Message, MessageId, SystemNotification, ToastDescriptor};
use pawlink_core::NotificationSurface;

/// Decides whether an incoming message surfaces a transient notification.
pub struct NotificationPresenter {
    surface: Arc<dyn NotificationSurface + Send + Sync>,
    config: NotifyConfig,
    /// Id of the most recently notified message.
    last_notified: Mutex<Option<MessageId>>,
}

impl NotificationPresenter {
    /// Create a presenter over the given surface.
    pub fn new(surface: Arc<dyn NotificationSurface + Send + Sync>, config: NotifyConfig) -> Self {
        Self {
            surface,
            config,
            last_notified: Mutex::new(None),
        }
    }

    /// Surface a notification for `message`, unless it was the last one
    /// notified. Surface failures are logged and swallowed.
    pub async fn notify(&self, message: &Message, view: &ConversationView) {
        {
            let mut last = self.last_notified.lock().await;
            if last.as_ref() == Some(&message.id) {
                debug!(message = %message.id, "duplicate notification suppressed");
                return;
            }
            *last = Some(message.id.clone());
        }

        let body = truncate_chars(&message.body, self.config.body_preview_chars);

        let toast = ToastDescriptor {
            sender_name: view.display_name.clone(),
            body: body.clone(),
            conversation_id: view.conversation.id.clone(),
            dismiss_after: self.config.toast_dismiss(),
        };
        if let Err(e) = self.surface.show_toast(&toast).await {
            warn!(error = %e, "toast delivery failed");
        }

        if self.config.system_notifications && !self.surface.is_focused() {
            match self.surface.request_permission().await {
                Ok(true) => {
                    let note = SystemNotification {
                        title: format!("New message from {}", view.display_name),
                        body,
                        icon: view
                            .other
                            .photo_url
                            .clone()
                            .or_else(|| self.config.icon.clone()),
                        tag: format!("message-{}", message.id),
                        link: format!("/messages?conversation={}", view.conversation.id),
                    };
                    if let Err(e) = self.surface.show_system(&note).await {
                        debug!(error = %e, "system notification unavailable");
                    }
                }
                Ok(false) => {
                    debug!("system notifications not permitted");
                }
                Err(e) => {
                    debug!(error = %e, "notification surface unavailable");
                }
            }
        }
    }
}

/// Truncate a string to at most `max` characters, on a char boundary.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
