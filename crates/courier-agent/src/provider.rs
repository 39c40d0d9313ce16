use async_trait::async_trait;

/// Request to a text-generation backend. The prompt already carries any
/// rendered conversation context — the backend sees one flat string.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// Common interface for text-generation backends.
///
/// One implementation ships (Gemini); the seam exists so the relay pipeline
/// can be exercised against a mock.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logging and error messages.
    fn name(&self) -> &str;

    /// Send a generation request, wait for the full reply text.
    async fn generate(&self, req: &GenerateRequest) -> Result<String, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// The call succeeded but the model produced no output.
    #[error("no candidates returned")]
    NoCandidates,
}
