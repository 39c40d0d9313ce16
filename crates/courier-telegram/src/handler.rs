//! Telegram message handler registered in the teloxide Dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{info, warn};

use courier_agent::pipeline::relay_exchange;
use courier_agent::provider::ProviderError;

use crate::allow;
use crate::context::RelayContext;
use crate::send;
use crate::typing::TypingIndicator;

const PROMPT_FOR_INPUT: &str = "Please send me some text along with the mention.";
const NO_ANSWER_NOTICE: &str = "The model returned no answer. Try rephrasing your message.";
const CLEARED_NOTICE: &str = "Conversation history cleared.";
const REJECTED_NOTICE: &str = "This chat is not on the bot's allow list.";

/// Main message handler registered in the teloxide Dispatcher.
///
/// Runs for every incoming `Message`. Performs:
/// 1. Bot-message and non-text filter
/// 2. Chat allow-list gate
/// 3. Command interception (works without addressing the bot)
/// 4. Addressed filter (mention or reply-to-bot)
/// 5. Mention stripping + empty-input notice
/// 6. Non-blocking relay: typing indicator, backend call, segmented delivery
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    ctx: Arc<RelayContext>,
) -> ResponseResult<()> {
    // 1. Ignore messages from other bots and messages with no sender.
    let from = match msg.from.as_ref() {
        Some(u) if !u.is_bot => u,
        _ => return Ok(()),
    };

    // Text messages only — media has nothing to relay.
    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    let chat_id = msg.chat.id;
    let thread_id = msg.thread_id;

    // 2. Allow-list gate. Silent drop unless a rejection notice is configured.
    if !allow::is_allowed(&ctx.config.telegram.allow_chats, chat_id.0) {
        if ctx.config.telegram.notify_rejected {
            send::send_plain(&bot, chat_id, thread_id, REJECTED_NOTICE).await;
        }
        return Ok(());
    }

    // 3. Commands are honored without a mention, like any command handler.
    let user_id = from.id.0.to_string();
    if let Some(response) = handle_command(&text, &user_id, &ctx) {
        send::send_plain(&bot, chat_id, thread_id, &response).await;
        return Ok(());
    }

    // 4. Addressed filter: mention or reply to one of our own messages.
    let is_reply_to_bot = msg
        .reply_to_message()
        .and_then(|reply| reply.from.as_ref())
        .map(|u| u.id == ctx.identity.id)
        .unwrap_or(false);
    if !is_reply_to_bot && !contains_mention(&text, &ctx.identity.username) {
        return Ok(());
    }

    // 5. Strip the mention; an empty remainder gets a prompt, not a backend call.
    let query = strip_mention(&text, &ctx.identity.username);
    if query.is_empty() {
        send::send_plain(&bot, chat_id, thread_id, PROMPT_FOR_INPUT).await;
        return Ok(());
    }

    info!(chat_id = chat_id.0, user_id = %user_id, "relaying query");

    // 6. Run the exchange in a separate task (non-blocking for the dispatcher).
    let ctx2 = Arc::clone(&ctx);
    tokio::spawn(async move {
        let typing = TypingIndicator::start(bot.clone(), chat_id, thread_id);

        let result = relay_exchange(
            ctx2.generator.as_ref(),
            &ctx2.store,
            &ctx2.config.chat,
            &user_id,
            &query,
        )
        .await;

        typing.stop();

        match result {
            Ok(reply) => {
                send::deliver(
                    &bot,
                    chat_id,
                    thread_id,
                    &reply,
                    ctx2.config.telegram.dialect,
                    ctx2.config.telegram.segment_limit,
                )
                .await;
            }
            Err(ProviderError::NoCandidates) => {
                send::send_plain(&bot, chat_id, thread_id, NO_ANSWER_NOTICE).await;
            }
            Err(e) => {
                warn!(error = %e, user_id = %user_id, "relay failed");
                let notice = format!("⚠️ Error: {e}");
                send::send_plain(&bot, chat_id, thread_id, &notice).await;
            }
        }
    });

    Ok(())
}

/// Handle `/start` and `/clear`.
///
/// Returns `Some(response)` if the message was a recognized command,
/// `None` if it should continue through the relay filter.
fn handle_command(text: &str, user_id: &str, ctx: &RelayContext) -> Option<String> {
    match command(text, &ctx.identity.username)? {
        "/start" => Some(format!(
            "Hi! I'm a bot backed by Google's Gemini model. Mention me with @{} \
             or reply to one of my messages to get an answer. Send /clear to \
             reset our conversation.",
            ctx.identity.username
        )),
        "/clear" => {
            ctx.store.clear(user_id);
            Some(CLEARED_NOTICE.to_string())
        }
        _ => None,
    }
}

/// Extract the leading slash command, honoring the `/cmd@botname` group form.
///
/// Returns `None` for non-commands and for commands addressed to other bots.
fn command<'a>(text: &'a str, bot_username: &str) -> Option<&'a str> {
    let first = text.trim().split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    match first.split_once('@') {
        Some((cmd, target)) => {
            if target.eq_ignore_ascii_case(bot_username) {
                Some(cmd)
            } else {
                None
            }
        }
        None => Some(first),
    }
}

/// Return `true` if `text` contains a `@bot_username` mention.
fn contains_mention(text: &str, bot_username: &str) -> bool {
    if bot_username.is_empty() {
        return false;
    }
    let mention = format!("@{bot_username}");
    text.contains(&mention)
}

/// Remove every `@bot_username` mention and trim surrounding whitespace.
fn strip_mention(text: &str, bot_username: &str) -> String {
    if bot_username.is_empty() {
        return text.trim().to_string();
    }
    let mention = format!("@{bot_username}");
    text.replace(&mention, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use courier_agent::provider::{GenerateRequest, ProviderError, TextGenerator};
    use courier_core::config::{
        ChatConfig, CourierConfig, GeminiConfig, GenerationConfig, TelegramConfig,
    };
    use courier_core::types::Turn;
    use courier_markup::Dialect;
    use courier_memory::ContextStore;

    use crate::context::{BotIdentity, RelayContext};

    struct NullGenerator;

    #[async_trait]
    impl TextGenerator for NullGenerator {
        fn name(&self) -> &str {
            "null"
        }
        async fn generate(&self, _req: &GenerateRequest) -> Result<String, ProviderError> {
            Err(ProviderError::NoCandidates)
        }
    }

    fn ctx() -> RelayContext {
        RelayContext {
            config: CourierConfig {
                telegram: TelegramConfig {
                    bot_token: "token".into(),
                    dialect: Dialect::Strict,
                    segment_limit: 4096,
                    allow_chats: Vec::new(),
                    notify_rejected: false,
                },
                gemini: GeminiConfig {
                    api_key: "key".into(),
                    model: "gemini-1.5-flash".into(),
                    base_url: "https://generativelanguage.googleapis.com".into(),
                    generation: GenerationConfig::default(),
                    safety: Vec::new(),
                },
                chat: ChatConfig::default(),
            },
            generator: Box::new(NullGenerator),
            store: ContextStore::new(64),
            identity: BotIdentity {
                id: teloxide::types::UserId(42),
                username: "courierbot".into(),
            },
        }
    }

    #[test]
    fn contains_mention_positive() {
        assert!(contains_mention("Hey @courierbot, help!", "courierbot"));
    }

    #[test]
    fn contains_mention_negative() {
        assert!(!contains_mention("Hello there", "courierbot"));
    }

    #[test]
    fn contains_mention_empty_username() {
        assert!(!contains_mention("@foo bar", ""));
    }

    #[test]
    fn strip_mention_removes_all_occurrences() {
        assert_eq!(
            strip_mention("@courierbot what is @courierbot doing", "courierbot"),
            "what is  doing"
        );
    }

    #[test]
    fn strip_mention_trims_whitespace() {
        assert_eq!(strip_mention("  @courierbot   hello  ", "courierbot"), "hello");
    }

    #[test]
    fn mention_only_message_strips_to_empty() {
        assert_eq!(strip_mention("@courierbot", "courierbot"), "");
    }

    #[test]
    fn bare_command_is_recognized() {
        assert_eq!(command("/start", "courierbot"), Some("/start"));
        assert_eq!(command("  /clear  ", "courierbot"), Some("/clear"));
    }

    #[test]
    fn group_form_command_matches_our_bot_only() {
        assert_eq!(command("/start@courierbot", "courierbot"), Some("/start"));
        assert_eq!(command("/start@otherbot", "courierbot"), None);
    }

    #[test]
    fn non_command_text_is_not_a_command() {
        assert_eq!(command("hello /start", "courierbot"), None);
        assert_eq!(command("plain text", "courierbot"), None);
    }

    #[test]
    fn start_notice_names_the_handle() {
        let ctx = ctx();
        let response = handle_command("/start", "7", &ctx).unwrap();
        assert!(response.contains("@courierbot"));
    }

    #[test]
    fn clear_resets_the_transcript() {
        let ctx = ctx();
        ctx.store.append("7", Turn::user("hi"));
        assert_eq!(ctx.store.turn_count("7"), 1);

        let response = handle_command("/clear", "7", &ctx).unwrap();
        assert_eq!(response, CLEARED_NOTICE);
        assert_eq!(ctx.store.turn_count("7"), 0);
    }

    #[test]
    fn clear_only_touches_the_invoking_user() {
        let ctx = ctx();
        ctx.store.append("7", Turn::user("mine"));
        ctx.store.append("8", Turn::user("theirs"));

        assert!(handle_command("/clear", "7", &ctx).is_some());
        assert_eq!(ctx.store.turn_count("7"), 0);
        assert_eq!(ctx.store.turn_count("8"), 1);
    }

    #[test]
    fn unknown_command_falls_through() {
        let ctx = ctx();
        assert!(handle_command("/unknown", "7", &ctx).is_none());
        assert!(handle_command("not a command", "7", &ctx).is_none());
    }
}
