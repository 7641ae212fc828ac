//! `lembra-scheduler`: SQLite-backed reminder store and the polling engine
//! that delivers due reminders.
//!
//! # Overview
//!
//! Reminders live in the `reminders` table with a minute-precision `due_at`.
//! The [`engine::SchedulerEngine`] wakes up every poll interval, asks the
//! [`store::ReminderStore`] for everything due at or before "now", hands each
//! reminder to the injected [`lembra_core::Notifier`] and deletes it once the
//! send is confirmed. Failed sends stay in the table and are retried on the
//! next tick.
//!
//! # Reminder lifecycle
//!
//! | State               | Meaning                                        |
//! |---------------------|------------------------------------------------|
//! | `Pending`           | Stored, `due_at` not reached or not yet polled  |
//! | `Due`               | Returned by a tick's `list_due`                 |
//! | `Delivered&Removed` | Notifier confirmed, row deleted (terminal)      |

pub mod db;
pub mod due;
pub mod engine;
pub mod entries;
pub mod error;
pub mod store;
pub mod types;

pub use due::DueAt;
pub use engine::{SchedulerEngine, SchedulerSettings, TickReport};
pub use entries::EntryStore;
pub use error::{Result, SchedulerError, ValidationError};
pub use store::ReminderStore;
pub use types::{Entry, EntryKind, Reminder};
