//! Channel-agnostic relay orchestration.
//!
//! `relay_exchange` runs one full exchange: build the prompt (with or without
//! the per-user transcript), call the backend, and record the exchange. The
//! caller owns channel-specific concerns — markup translation, chunked
//! delivery, notices.

use tracing::info;

use courier_core::config::ChatConfig;
use courier_core::types::Turn;
use courier_memory::ContextStore;

use crate::prompt;
use crate::provider::{GenerateRequest, ProviderError, TextGenerator};

/// Run one exchange for `user_id`.
///
/// In contextual mode the prompt carries the stored transcript and, on
/// success, both turns of the exchange are appended under one lock. A failed
/// or empty backend call leaves the transcript untouched — the user can
/// simply re-ask.
pub async fn relay_exchange(
    generator: &dyn TextGenerator,
    store: &ContextStore,
    chat: &ChatConfig,
    user_id: &str,
    text: &str,
) -> Result<String, ProviderError> {
    let prompt = if chat.contextual {
        prompt::render(&chat.system_instruction, &store.transcript(user_id), text)
    } else {
        text.to_string()
    };

    let reply = generator
        .generate(&GenerateRequest { prompt })
        .await?;

    info!(
        backend = generator.name(),
        user_id,
        reply_chars = reply.chars().count(),
        "exchange complete"
    );

    if chat.contextual {
        store.append_exchange(user_id, Turn::user(text), Turn::assistant(reply.clone()));
    }

    Ok(reply)
}
