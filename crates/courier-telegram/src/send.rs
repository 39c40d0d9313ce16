//! Ordered segment delivery for generated replies.
//!
//! The raw reply is translated into the configured dialect, split into
//! size-bounded segments, and sent in order to the originating chat/thread.
//! When Telegram rejects a segment's parse mode the segment is resent as
//! plain text — reported once, never retried.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ThreadId};
use tracing::warn;

use courier_markup::{split, translate, Dialect};

/// Pause between consecutive segments, to stay clear of flood limits.
const INTER_SEGMENT_DELAY_MS: u64 = 100;

/// The parse mode each dialect targets.
pub fn parse_mode_for(dialect: Dialect) -> ParseMode {
    match dialect {
        Dialect::Strict => ParseMode::MarkdownV2,
        Dialect::Rich => ParseMode::Markdown,
    }
}

/// Translate `raw` and deliver it as ordered segments.
pub async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    thread_id: Option<ThreadId>,
    raw: &str,
    dialect: Dialect,
    limit: usize,
) {
    let translated = translate(raw, dialect);
    let segments = match split(&translated, limit) {
        Ok(segments) => segments,
        Err(e) => {
            // Unreachable with a validated config; don't drop the reply silently.
            warn!(error = %e, "segment limit rejected — sending untranslated reply");
            send_plain(bot, chat_id, thread_id, raw).await;
            return;
        }
    };

    let mode = parse_mode_for(dialect);
    for (i, segment) in segments.iter().enumerate() {
        let mut request = bot.send_message(chat_id, segment).parse_mode(mode);
        if let Some(tid) = thread_id {
            request = request.message_thread_id(tid);
        }

        if request.await.is_err() {
            // Markup rejected by the renderer — fall back to plain text.
            let mut fallback = bot.send_message(chat_id, segment);
            if let Some(tid) = thread_id {
                fallback = fallback.message_thread_id(tid);
            }
            if let Err(e) = fallback.await {
                warn!(error = %e, segment_index = i, "failed to send plain-text fallback");
            }
        }

        if i + 1 < segments.len() {
            tokio::time::sleep(Duration::from_millis(INTER_SEGMENT_DELAY_MS)).await;
        }
    }
}

/// Best-effort single plain-text message (notices, error replies).
pub async fn send_plain(bot: &Bot, chat_id: ChatId, thread_id: Option<ThreadId>, text: &str) {
    let mut request = bot.send_message(chat_id, text);
    if let Some(tid) = thread_id {
        request = request.message_thread_id(tid);
    }
    if let Err(e) = request.await {
        warn!(error = %e, "failed to send notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_targets_markdown_v2() {
        assert_eq!(parse_mode_for(Dialect::Strict), ParseMode::MarkdownV2);
    }

    #[test]
    fn rich_targets_legacy_markdown() {
        assert_eq!(parse_mode_for(Dialect::Rich), ParseMode::Markdown);
    }
}
