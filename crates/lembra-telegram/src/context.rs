use lembra_scheduler::{EntryStore, ReminderStore};

/// What the Telegram handler needs from the application.
///
/// Implemented by the binary's `AppState`; tests can supply in-memory stores.
pub trait TelegramAppContext: Send + Sync {
    fn reminders(&self) -> &ReminderStore;
    fn entries(&self) -> &EntryStore;
}
