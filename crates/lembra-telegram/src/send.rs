//! Message sending helpers for the Telegram adapter.
//!
//! Telegram's message limit is 4096 characters; we cut at 4090 on line
//! boundaries so long listings arrive as several messages.

use std::time::Duration;

use teloxide::prelude::*;
use tracing::warn;

/// Maximum characters per Telegram message (limit is 4096; we use 4090 for safety).
const CHUNK_MAX: usize = 4090;

/// Split `text` into chunks of at most [`CHUNK_MAX`] characters, preferring
/// line breaks. A single over-long line is hard-split on a char boundary.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.chars().count() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let mut line = line;
        loop {
            let line_len = line.chars().count();
            let sep = usize::from(!current.is_empty());
            if current_len + sep + line_len <= CHUNK_MAX {
                if sep == 1 {
                    current.push('\n');
                }
                current.push_str(line);
                current_len += sep + line_len;
                break;
            }
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            // Line alone is too long for one message.
            let cut = line
                .char_indices()
                .nth(CHUNK_MAX)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Send `text` to `chat_id` as one or more plain-text messages.
///
/// Failures are logged, not returned: replies are best effort.
/// A 100ms delay is inserted between consecutive chunks to avoid hitting rate limits.
pub async fn send_response(bot: &Bot, chat_id: ChatId, text: &str) {
    let chunks = split_chunks(text);
    for (i, chunk) in chunks.iter().enumerate() {
        if let Err(e) = bot.send_message(chat_id, chunk).await {
            warn!(error = %e, chat_id = chat_id.0, chunk_index = i, "Telegram: failed to send reply");
        }
        if i + 1 < chunks.len() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
