//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the long-polling event
//! loop until the process exits. The bot's own identity is resolved once,
//! before the first update, and held read-only for the life of the process.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use courier_agent::provider::TextGenerator;
use courier_core::config::CourierConfig;
use courier_memory::ContextStore;

use crate::context::{BotIdentity, RelayContext};
use crate::error::TelegramError;
use crate::handler::handle_message;

/// Telegram channel adapter.
///
/// Long polling — no public URL required.
pub struct TelegramAdapter {
    config: CourierConfig,
    generator: Box<dyn TextGenerator>,
    store: ContextStore,
}

impl TelegramAdapter {
    pub fn new(
        config: CourierConfig,
        generator: Box<dyn TextGenerator>,
        store: ContextStore,
    ) -> Self {
        Self {
            config,
            generator,
            store,
        }
    }

    /// Connect to Telegram and drive the long-polling loop.
    ///
    /// Returns only if identity resolution fails; afterwards it runs for the
    /// lifetime of the process.
    pub async fn run(self) -> Result<(), TelegramError> {
        let bot = Bot::new(&self.config.telegram.bot_token);

        // One getMe at startup instead of one per message.
        let me = bot.get_me().await?;
        let username = match me.user.username.as_deref() {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => return Err(TelegramError::NoUsername),
        };
        let identity = BotIdentity {
            id: me.user.id,
            username,
        };

        info!(
            username = %identity.username,
            backend = self.generator.name(),
            "Telegram: identity resolved, starting long-polling dispatcher"
        );

        let ctx = Arc::new(RelayContext {
            config: self.config,
            generator: self.generator,
            store: self.store,
            identity,
        });

        let handler = Update::filter_message().endpoint(handle_message);

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![ctx])
            .default_handler(|_upd| async {})
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
