use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use courier_markup::Dialect;

/// Telegram's hard ceiling on message length, in characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Top-level config (courier.toml + COURIER_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierConfig {
    pub telegram: TelegramConfig,
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Markup dialect used for outbound messages.
    /// `strict` — MarkdownV2, every reserved character escaped.
    /// `rich` — legacy Markdown, emphasis converted structurally.
    #[serde(default)]
    pub dialect: Dialect,
    /// Maximum characters per outbound message segment.
    #[serde(default = "default_segment_limit")]
    pub segment_limit: usize,
    /// Chat IDs allowed to use the bot. Empty = no gating.
    #[serde(default)]
    pub allow_chats: Vec<i64>,
    /// When true, non-allowed chats get a rejection notice instead of silence.
    #[serde(default)]
    pub notify_rejected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Safety policy sent with every request. The default mirrors the
    /// shipped persona: permissive on explicit/dangerous content, strict on
    /// hate/harassment. Product policy — override in courier.toml.
    #[serde(default = "default_safety")]
    pub safety: Vec<SafetySetting>,
}

/// Sampling parameters for the generateContent call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// One harm-category → block-threshold pair of the safety policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockThreshold {
    #[serde(rename = "BLOCK_NONE")]
    BlockNone,
    #[serde(rename = "BLOCK_ONLY_HIGH")]
    BlockOnlyHigh,
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE")]
    BlockMediumAndAbove,
    #[serde(rename = "BLOCK_LOW_AND_ABOVE")]
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// When true, each prompt carries the per-user transcript.
    #[serde(default = "bool_true")]
    pub contextual: bool,
    /// Transcript cap: oldest turn evicted first once exceeded.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            contextual: true,
            max_turns: default_max_turns(),
            system_instruction: default_system_instruction(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_segment_limit() -> usize {
    TELEGRAM_MESSAGE_LIMIT
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_temperature() -> f64 {
    0.5
}
fn default_top_p() -> f64 {
    0.95
}
fn default_top_k() -> u32 {
    64
}
fn default_max_output_tokens() -> u32 {
    4096
}
fn default_max_turns() -> usize {
    64
}
fn default_system_instruction() -> String {
    "You are a helpful assistant in a group chat. Answer concisely.".to_string()
}

fn default_safety() -> Vec<SafetySetting> {
    vec![
        SafetySetting {
            category: HarmCategory::SexuallyExplicit,
            threshold: BlockThreshold::BlockNone,
        },
        SafetySetting {
            category: HarmCategory::DangerousContent,
            threshold: BlockThreshold::BlockNone,
        },
        SafetySetting {
            category: HarmCategory::HateSpeech,
            threshold: BlockThreshold::BlockLowAndAbove,
        },
        SafetySetting {
            category: HarmCategory::Harassment,
            threshold: BlockThreshold::BlockLowAndAbove,
        },
    ]
}

impl CourierConfig {
    /// Load config from a TOML file with COURIER_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.courier/courier.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CourierConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("COURIER_").split("__"))
            .extract()
            .map_err(|e| crate::error::CourierError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Startup validation — every failure here is fatal.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.telegram.bot_token.is_empty() {
            return Err(crate::error::CourierError::Config(
                "telegram.bot_token is empty".into(),
            ));
        }
        if self.gemini.api_key.is_empty() {
            return Err(crate::error::CourierError::Config(
                "gemini.api_key is empty".into(),
            ));
        }
        if self.telegram.segment_limit == 0 {
            return Err(crate::error::CourierError::Config(
                "telegram.segment_limit must be positive".into(),
            ));
        }
        if self.telegram.segment_limit > TELEGRAM_MESSAGE_LIMIT {
            return Err(crate::error::CourierError::Config(format!(
                "telegram.segment_limit {} exceeds Telegram's ceiling of {}",
                self.telegram.segment_limit, TELEGRAM_MESSAGE_LIMIT
            )));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.courier/courier.toml", home)
}
