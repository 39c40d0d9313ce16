use tracing::info;

use courier_agent::GeminiProvider;
use courier_core::config::CourierConfig;
use courier_memory::ContextStore;
use courier_telegram::TelegramAdapter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "courier_bot=info,courier_telegram=info,courier_agent=info".into()
                }),
        )
        .init();

    // load config: explicit path via COURIER_CONFIG > ~/.courier/courier.toml
    let config_path = std::env::var("COURIER_CONFIG").ok();
    let config = CourierConfig::load(config_path.as_deref())?;
    config.validate()?;

    info!(
        model = %config.gemini.model,
        dialect = ?config.telegram.dialect,
        contextual = config.chat.contextual,
        "starting courier"
    );

    let generator = Box::new(GeminiProvider::new(config.gemini.clone()));
    let store = ContextStore::new(config.chat.max_turns);

    TelegramAdapter::new(config, generator, store).run().await?;
    Ok(())
}
