use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lembra_core::config::SchedulerConfig;
use lembra_core::notify::{Notifier, NotifyError};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::{due::DueAt, error::Result, store::ReminderStore};

/// Timing knobs for the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub poll_interval: Duration,
    pub notify_timeout: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from(&SchedulerConfig::default())
    }
}

impl From<&SchedulerConfig> for SchedulerSettings {
    fn from(cfg: &SchedulerConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(cfg.poll_interval_secs.max(1)),
            notify_timeout: Duration::from_secs(cfg.notify_timeout_secs.max(1)),
        }
    }
}

/// Outcome of one poll tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Confirmed sends during this tick.
    pub delivered: usize,
    /// Failed or timed-out sends; those records stay for the next tick.
    pub failed: usize,
    /// Reminders already delivered whose row could not be deleted. They are
    /// not sent again; only the delete is retried on later ticks.
    pub undeleted: usize,
}

/// Polls the reminder table and delivers whatever is due.
///
/// One engine per process: two engines on the same database would both see
/// the same due rows.
pub struct SchedulerEngine<N: Notifier> {
    store: ReminderStore,
    notifier: Arc<N>,
    settings: SchedulerSettings,
    /// Ids sent successfully whose delete failed.
    undeleted: Mutex<HashSet<i64>>,
}

impl<N: Notifier> SchedulerEngine<N> {
    pub fn new(store: ReminderStore, notifier: Arc<N>, settings: SchedulerSettings) -> Self {
        Self {
            store,
            notifier,
            settings,
            undeleted: Mutex::new(HashSet::new()),
        }
    }

    /// Main event loop. Ticks every `poll_interval` until `shutdown` broadcasts `true`.
    ///
    /// A running tick is never interrupted; shutdown only stops future ticks.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_secs = self.settings.poll_interval.as_secs(),
            "scheduler engine started"
        );
        self.log_overdue_on_startup();

        let mut interval = tokio::time::interval(self.settings.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick(DueAt::now_local()).await {
                        error!("scheduler tick error: {e}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Deliver every reminder due at or before `now`.
    ///
    /// Only a failure to list due reminders is returned; per-reminder notify
    /// and delete failures are logged and the tick moves on. A reminder that
    /// was sent but could not be deleted is never sent again by this engine.
    pub async fn tick(&self, now: DueAt) -> Result<TickReport> {
        let due = self.store.list_due(now)?;
        let mut report = TickReport::default();
        // Rows removed by someone else no longer need a delete retry.
        self.undeleted().retain(|id| due.iter().any(|r| r.id == *id));
        if due.is_empty() {
            return Ok(report);
        }
        debug!(count = due.len(), now = %now, "due reminders found");

        for reminder in due {
            let already_sent = self.undeleted().contains(&reminder.id);
            if !already_sent {
                if let Err(e) = self.notify(reminder.owner_id, &reminder.text).await {
                    report.failed += 1;
                    warn!(
                        reminder_id = reminder.id,
                        owner_id = reminder.owner_id,
                        "delivery failed, retrying next tick: {e}"
                    );
                    continue;
                }
                report.delivered += 1;
            }

            match self.store.delete(reminder.id) {
                Ok(_) => {
                    self.undeleted().remove(&reminder.id);
                    info!(
                        reminder_id = reminder.id,
                        owner_id = reminder.owner_id,
                        retried_delete = already_sent,
                        "reminder delivered"
                    );
                }
                Err(e) => {
                    report.undeleted += 1;
                    self.undeleted().insert(reminder.id);
                    error!(
                        reminder_id = reminder.id,
                        "reminder delivered but not deleted, retrying delete next tick: {e}"
                    );
                }
            }
        }
        Ok(report)
    }

    fn undeleted(&self) -> MutexGuard<'_, HashSet<i64>> {
        // A HashSet of ids stays consistent even if a holder panicked.
        self.undeleted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn notify(&self, owner_id: i64, text: &str) -> std::result::Result<(), NotifyError> {
        let timeout = self.settings.notify_timeout;
        match tokio::time::timeout(timeout, self.notifier.send(owner_id, text)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout {
                ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Reminders whose minute passed while the process was down fire on the first tick.
    fn log_overdue_on_startup(&self) {
        match self.store.count_due(DueAt::now_local()) {
            Ok(n) if n > 0 => warn!(count = n, "overdue reminders will be delivered now"),
            Err(e) => error!("overdue-on-startup query failed: {e}"),
            _ => {}
        }
    }
}
