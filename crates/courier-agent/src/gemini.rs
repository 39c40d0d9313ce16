//! Google Generative Language API client (Gemini, API-key flavor).
//!
//! POSTs to the `generateContent` endpoint with the configured sampling
//! parameters and safety policy, and extracts the first candidate's text.

use serde::Deserialize;
use tracing::{debug, warn};

use courier_core::config::GeminiConfig;

use crate::provider::{GenerateRequest, ProviderError, TextGenerator};

pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the generateContent request body.
    fn build_body(&self, req: &GenerateRequest) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": req.prompt }]
            }],
            "generationConfig": {
                "temperature": self.config.generation.temperature,
                "topP": self.config.generation.top_p,
                "topK": self.config.generation.top_k,
                "maxOutputTokens": self.config.generation.max_output_tokens,
            },
            "safetySettings": self.config.safety,
        })
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, req: &GenerateRequest) -> Result<String, ProviderError> {
        let url = self.endpoint();
        let body = self.build_body(req);

        debug!(model = %self.config.model, "sending request to Gemini");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Gemini error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let api_resp: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        extract_text(api_resp)
    }
}

/// Join the first candidate's text parts; an absent or empty candidate is
/// `NoCandidates`, not an empty reply.
fn extract_text(resp: GenerateContentResponse) -> Result<String, ProviderError> {
    let candidate = match resp.candidates.into_iter().next() {
        Some(c) => c,
        None => return Err(ProviderError::NoCandidates),
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::NoCandidates);
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::config::{GeminiConfig, GenerationConfig};

    fn provider() -> GeminiProvider {
        let config: GeminiConfig = serde_json::from_value(serde_json::json!({
            "api_key": "test-key",
        }))
        .unwrap();
        GeminiProvider::new(config)
    }

    #[test]
    fn endpoint_includes_model_and_version() {
        let p = provider();
        assert_eq!(
            p.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn body_carries_sampling_and_safety() {
        let p = provider();
        let body = p.build_body(&GenerateRequest {
            prompt: "hello".into(),
        });

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");

        let generation = &body["generationConfig"];
        let defaults = GenerationConfig::default();
        assert_eq!(generation["temperature"], defaults.temperature);
        assert_eq!(generation["topP"], defaults.top_p);
        assert_eq!(generation["topK"], defaults.top_k);
        assert_eq!(generation["maxOutputTokens"], defaults.max_output_tokens);

        let safety = body["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), 4);
        assert!(safety
            .iter()
            .any(|s| s["category"] == "HARM_CATEGORY_SEXUALLY_EXPLICIT"
                && s["threshold"] == "BLOCK_NONE"));
    }

    #[test]
    fn response_text_is_joined_from_parts() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "Hello " }, { "text": "world" }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), "Hello world");
    }

    #[test]
    fn empty_candidates_is_no_candidates() {
        let resp: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(matches!(
            extract_text(resp),
            Err(ProviderError::NoCandidates)
        ));
    }

    #[test]
    fn candidate_without_text_is_no_candidates() {
        // Safety-blocked candidates come back with no content parts.
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert!(matches!(
            extract_text(resp),
            Err(ProviderError::NoCandidates)
        ));
    }
}
