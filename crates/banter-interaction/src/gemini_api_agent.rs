//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! This agent calls the Gemini REST API directly. Configuration is loaded
//! from secret.json.

use async_trait::async_trait;
use banter_core::config::WidgetConfig;
use banter_core::inference::{InferenceAgent, InferenceError};
use banter_infrastructure::SecretStore;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Agent implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Loads credentials from secret.json at the default location.
    ///
    /// The model comes from the secret's optional override, falling back to
    /// the widget configuration.
    pub async fn try_from_secrets(config: &WidgetConfig) -> Result<Self, InferenceError> {
        let store = SecretStore::default_location().map_err(|e| {
            InferenceError::Request(format!("failed to locate secret store: {}", e))
        })?;

        let secrets = store
            .load()
            .await
            .map_err(|e| InferenceError::Request(format!("failed to load secrets: {}", e)))?;

        let gemini = secrets.gemini.ok_or_else(|| {
            InferenceError::Request("Gemini configuration not found in secret.json".to_string())
        })?;

        let model = gemini.model.unwrap_or_else(|| config.model.clone());
        Ok(Self::new(gemini.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<String, InferenceError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        // One attempt per call; the transport's default timeout applies.
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| InferenceError::Request(format!("Gemini API request failed: {}", err)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| InferenceError::Parse(err.to_string()))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl InferenceAgent for GeminiApiAgent {
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, InferenceError> {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(InferenceError::EmptyResponse);
    }
    Ok(text)
}

fn map_http_error(status: StatusCode, body: String) -> InferenceError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{}: {}", status_text, msg)
            }
        })
        .unwrap_or_else(|_| body.clone());

    InferenceError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_text_from_first_candidate() {
        let response = response_from(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "  Hi there  "}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        );
        assert_eq!(extract_text_response(response).unwrap(), "Hi there");
    }

    #[test]
    fn test_extract_text_missing_candidates_is_empty_response() {
        let response = response_from(r#"{}"#);
        assert!(matches!(
            extract_text_response(response),
            Err(InferenceError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_text_blank_payload_is_empty_response() {
        let response = response_from(r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#);
        assert!(matches!(
            extract_text_response(response),
            Err(InferenceError::EmptyResponse)
        ));
    }

    #[test]
    fn test_map_http_error_extracts_server_message() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#
                .to_string(),
        );
        match err {
            InferenceError::Status { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_map_http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        match err {
            InferenceError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "Hello".to_string(),
                }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");
    }
}
