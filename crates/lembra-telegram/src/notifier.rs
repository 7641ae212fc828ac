//! Scheduler-fired reminders delivered as Telegram messages.

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::debug;

use lembra_core::notify::{Notifier, NotifyError};

/// Sends reminders to the chat that created them (`owner_id` is the chat id).
///
/// One plain-text message per reminder; `Ok` only once Telegram accepted it,
/// so the engine never deletes a reminder that did not go out.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Text the user receives when a reminder fires.
pub fn reminder_message(text: &str) -> String {
    format!("⏰ Lembrete: {text}")
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, owner_id: i64, text: &str) -> Result<(), NotifyError> {
        // Not a Telegram chat; the engine will keep retrying it.
        if owner_id == 0 {
            return Err(NotifyError::InvalidRecipient(owner_id));
        }
        debug!(owner_id, "telegram: delivering reminder");
        self.bot
            .send_message(ChatId(owner_id), reminder_message(text))
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }
}
