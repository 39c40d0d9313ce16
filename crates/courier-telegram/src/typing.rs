//! Typing indicator shown while a backend call is in flight.
//!
//! Telegram drops the typing status after ~5 seconds, so it is re-sent on a
//! 4-second cadence until stopped. In forum supergroups the action is scoped
//! to the originating topic.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ChatAction, ThreadId};

const REFRESH_INTERVAL: Duration = Duration::from_secs(4);

/// Handle to a background typing-indicator task.
///
/// Dropped handles keep typing; call `stop()` once the reply is on its way.
pub struct TypingIndicator(tokio::task::JoinHandle<()>);

impl TypingIndicator {
    /// Send `ChatAction::Typing` immediately and keep refreshing it.
    pub fn start(bot: Bot, chat_id: ChatId, thread_id: Option<ThreadId>) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                let mut request = bot.send_chat_action(chat_id, ChatAction::Typing);
                if let Some(tid) = thread_id {
                    request = request.message_thread_id(tid);
                }
                let _ = request.await;
                tokio::time::sleep(REFRESH_INTERVAL).await;
            }
        });
        Self(handle)
    }

    /// Abort the refresh loop.
    pub fn stop(self) {
        self.0.abort();
    }
}
