pub mod adapter;
pub mod allow;
pub mod context;
pub mod error;
pub mod handler;
pub mod notifier;
pub mod router;
pub mod send;

pub use adapter::TelegramAdapter;
pub use context::TelegramAppContext;
pub use error::TelegramError;
pub use notifier::TelegramNotifier;
