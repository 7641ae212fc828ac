use std::sync::Arc;

use clap::Parser;
use tracing::info;

use lembra_core::config::LembraConfig;
use lembra_scheduler::{db, ReminderStore, SchedulerEngine, SchedulerSettings};
use lembra_telegram::TelegramAdapter;

mod app;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("LEMBRA_GIT_SHA"), ")");

#[derive(Parser)]
#[command(name = "lembra")]
#[command(version = VERSION)]
#[command(about = "Personal-assistant Telegram bot: notes, tasks and reminders")]
struct Cli {
    /// Config file (default: $LEMBRA_CONFIG, then ~/.lembra/lembra.toml)
    #[arg(long)]
    config: Option<String>,
    /// SQLite database file, overriding `database.path`
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lembra_bot=info,lembra_scheduler=info,lembra_telegram=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();
    info!(version = VERSION, "lembra starting");

    // load config: --config > LEMBRA_CONFIG env > ~/.lembra/lembra.toml
    let config_path = cli.config.or_else(|| std::env::var("LEMBRA_CONFIG").ok());
    let mut config = LembraConfig::load(config_path.as_deref())?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    let token = config.bot_token()?;

    let db_path = config.database.path.clone();
    config.ensure_database_dir()?;
    info!(path = %db_path, "opening SQLite database");
    let reminders = ReminderStore::new(db::open(&db_path)?)?;

    let settings = SchedulerSettings::from(&config.scheduler);
    let state = Arc::new(app::AppState::new(config, reminders));

    let adapter = TelegramAdapter::new(&token, &state.config.telegram, Arc::clone(&state))?;
    adapter.verify().await?;

    let engine = SchedulerEngine::new(
        state.reminders.clone(),
        Arc::new(adapter.notifier()),
        settings,
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let scheduler = tokio::spawn(engine.run(shutdown_rx));

    // returns on Ctrl-C
    adapter.run().await;

    // signal scheduler to stop; a tick in progress finishes first
    let _ = shutdown_tx.send(true);
    scheduler.await?;
    info!("lembra stopped");
    Ok(())
}

