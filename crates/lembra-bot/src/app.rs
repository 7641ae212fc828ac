use lembra_core::config::LembraConfig;
use lembra_scheduler::{EntryStore, ReminderStore};
use lembra_telegram::TelegramAppContext;

/// Central shared state, passed as `Arc<AppState>` to the Telegram handler.
///
/// Both stores share one SQLite connection; the scheduler engine gets its own
/// clone of `reminders`.
pub struct AppState {
    pub config: LembraConfig,
    pub reminders: ReminderStore,
    pub entries: EntryStore,
}

impl AppState {
    pub fn new(config: LembraConfig, reminders: ReminderStore) -> Self {
        let entries = EntryStore::new(&reminders);
        Self {
            config,
            reminders,
            entries,
        }
    }
}

impl TelegramAppContext for AppState {
    fn reminders(&self) -> &ReminderStore {
        &self.reminders
    }

    fn entries(&self) -> &EntryStore {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lembra_telegram::router::{execute, parse_intent};

    #[test]
    fn state_serves_router_from_one_database() {
        let state = AppState::new(
            LembraConfig::default(),
            ReminderStore::open_in_memory().unwrap(),
        );
        let intent = parse_intent("/lembrete 09/01/2026 12:00 dentista").unwrap();
        execute(intent, 10, &state);
        execute(parse_intent("/nota lembrar do guarda-chuva").unwrap(), 10, &state);

        assert_eq!(state.reminders.list_by_owner(10).unwrap().len(), 1);
        assert_eq!(
            state
                .entries
                .list(lembra_scheduler::EntryKind::Note, 10)
                .unwrap()
                .len(),
            1
        );
    }
}
