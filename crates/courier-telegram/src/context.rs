//! Shared per-process state handed to the message handler.

use courier_agent::provider::TextGenerator;
use courier_core::config::CourierConfig;
use courier_memory::ContextStore;

/// The bot's own identity, resolved once at startup via `getMe` and held
/// read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub id: teloxide::types::UserId,
    pub username: String,
}

/// Everything the handler needs, behind one `Arc`.
pub struct RelayContext {
    pub config: CourierConfig,
    pub generator: Box<dyn TextGenerator>,
    pub store: ContextStore,
    pub identity: BotIdentity,
}
