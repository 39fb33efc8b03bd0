//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::SynthesisConfig;

use super::{GenerationRequest, SynthesisError, TextGenerator};

/// Gemini text-generation backend.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is configured or the
    /// HTTP client cannot be built.
    pub fn new(config: &SynthesisConfig) -> Result<Self, SynthesisError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| SynthesisError::Configuration("Gemini API key not configured".into()))?;

        let client = Client::builder()
            .user_agent(concat!("repolens/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                SynthesisError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

impl From<&GenerationRequest> for GeminiRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: request.parts.iter().map(|part| GeminiPart::text(part)).collect(),
            }],
            system_instruction: (!request.system_instruction.is_empty()).then(|| GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(&request.system_instruction)],
            }),
        }
    }
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, SynthesisError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(SynthesisError::InvalidResponse(format!(
                "Prompt blocked: {reason}"
            )));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| SynthesisError::InvalidResponse("No candidates in response".into()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SynthesisError::InvalidResponse(format!(
                "Empty response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, SynthesisError> {
        let url = self.build_url(&request.model);
        let body = GeminiRequest::from(&request);

        debug!("Sending generateContent request for model {}", request.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Gemini API error: {status} - {text}");
            return Err(SynthesisError::from_status(status.as_u16(), text));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        gemini_response.into_text()
    }
}

// === Gemini API Types ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> GeminiClient {
        let config = SynthesisConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..SynthesisConfig::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "gemini-2.5-flash".to_string(),
            system_instruction: "Be concise.".to_string(),
            parts: vec!["Summarize this".to_string()],
        }
    }

    #[test]
    fn test_missing_api_key() {
        let err = GeminiClient::new(&SynthesisConfig::default()).err().unwrap();
        assert!(matches!(err, SynthesisError::Configuration(_)));
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(GeminiRequest::from(&request())).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "Summarize this"}]}],
                "systemInstruction": {"parts": [{"text": "Be concise."}]}
            })
        );
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "systemInstruction": {"parts": [{"text": "Be concise."}]}
            })))
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "## Overview\n"}, {"text": "A widget toolkit."}]},
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = client_for(&server).generate(request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "## Overview\nA widget toolkit.");
    }

    #[tokio::test]
    async fn test_quota_error_is_rate_limited() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Quota exceeded"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert!(matches!(err, SynthesisError::RateLimited(ref m) if m.contains("Quota exceeded")));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
