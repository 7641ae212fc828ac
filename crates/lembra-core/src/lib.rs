//! `lembra-core`: configuration, error types and the notification capability
//! shared by every lembra crate.

pub mod config;
pub mod error;
pub mod notify;

pub use config::LembraConfig;
pub use error::{LembraError, Result};
pub use notify::{Notifier, NotifyError};
