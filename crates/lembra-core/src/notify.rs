//! The delivery capability the scheduler consumes.
//!
//! The scheduler only knows that a notification was or was not delivered;
//! how it reaches the user (Telegram, a test recorder, ...) lives behind
//! [`Notifier`].

use async_trait::async_trait;
use thiserror::Error;

/// Why a notification could not be delivered.
///
/// The scheduler treats every variant as transient and keeps the reminder for
/// the next tick. That includes `InvalidRecipient`: a reminder whose owner can
/// never be reached (owner 0) is retried on every tick. Telegram chat ids are
/// never 0, so such a record can only come from writing to the table directly.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid recipient: {0}")]
    InvalidRecipient(i64),

    #[error("notification timed out after {ms}ms")]
    Timeout { ms: u64 },
}

/// Sends a text message to the chat/user identified by `owner_id`.
///
/// `Ok(())` must mean the transport confirmed the send: the scheduler deletes
/// the reminder right after.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, owner_id: i64, text: &str) -> Result<(), NotifyError>;
}

