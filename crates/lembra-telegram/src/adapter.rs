//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the long-polling event loop
//! until Ctrl-C.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use lembra_core::config::TelegramConfig;

use crate::context::TelegramAppContext;
use crate::error::TelegramError;
use crate::handler::handle_message;
use crate::notifier::TelegramNotifier;

/// Telegram channel adapter. Long polling, so no public URL is required.
pub struct TelegramAdapter<C: TelegramAppContext + 'static> {
    bot: Bot,
    ctx: Arc<C>,
    config: TelegramConfig,
}

impl<C: TelegramAppContext + 'static> TelegramAdapter<C> {
    pub fn new(token: &str, config: &TelegramConfig, ctx: Arc<C>) -> Result<Self, TelegramError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TelegramError::NoToken);
        }
        Ok(Self {
            bot: Bot::new(token),
            ctx,
            config: config.clone(),
        })
    }

    /// A notifier sharing this adapter's bot, for the scheduler engine.
    pub fn notifier(&self) -> TelegramNotifier {
        TelegramNotifier::new(self.bot.clone())
    }

    /// Check the token against Telegram before starting anything else.
    pub async fn verify(&self) -> Result<(), TelegramError> {
        let me = self.bot.get_me().await?;
        info!(
            username = me.user.username.as_deref().unwrap_or(""),
            "Telegram: authenticated"
        );
        Ok(())
    }

    /// Drive the long-polling loop. Returns after Ctrl-C.
    pub async fn run(self) {
        info!("Telegram: starting long-polling dispatcher");

        let handler = Update::filter_message().endpoint(handle_message::<C>);

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![self.ctx, self.config])
            .default_handler(|_upd| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram: dispatcher stopped");
    }
}
