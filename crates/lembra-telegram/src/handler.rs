//! Telegram message handler registered in the teloxide Dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::debug;

use lembra_core::config::TelegramConfig;

use crate::allow;
use crate::context::TelegramAppContext;
use crate::router;
use crate::send;

/// Main message handler registered in the teloxide Dispatcher.
///
/// Runs for every incoming `Message`:
/// 1. Bot-message filter
/// 2. Allowlist check
/// 3. Intent parsing (commands and free text); anything else is ignored
/// 4. Intent execution against the stores, reply to the same chat
///
/// The owner of every note/task/reminder is the chat id, so a reminder created
/// in a group fires in that group.
pub async fn handle_message<C: TelegramAppContext + 'static>(
    bot: Bot,
    msg: Message,
    ctx: Arc<C>,
    config: TelegramConfig,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    if from.is_bot {
        return Ok(());
    }

    if !allow::is_allowed(&config.allow_users, from.username.as_deref(), from.id.0) {
        debug!(user_id = from.id.0, "telegram: sender not in allowlist");
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(intent) = router::parse_intent(text) else {
        return Ok(());
    };

    let owner_id = msg.chat.id.0;
    debug!(owner_id, ?intent, "telegram: intent");
    let reply = router::execute(intent, owner_id, ctx.as_ref());
    send::send_response(&bot, msg.chat.id, &reply).await;
    Ok(())
}
