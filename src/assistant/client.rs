//! Chat-completions client for the hosted model
//!
//! Speaks the OpenAI-compatible `/chat/completions` wire format. Both the
//! chat assistant and the ingredient scanner go through this client.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AssistantSettings;
use crate::error::{CostbookError, CostbookResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Message content: plain text, or a list of parts when an image is attached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user message carrying text and an image data URL
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct GenerativeClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
    api_key_env: String,
}

impl GenerativeClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.2,
            api_key,
            api_key_env: String::new(),
        }
    }

    /// Build a client from settings, reading the key from the configured
    /// environment variable
    pub fn from_settings(settings: &AssistantSettings) -> Self {
        Self {
            temperature: settings.temperature,
            api_key_env: settings.api_key_env.clone(),
            ..Self::new(&settings.endpoint, &settings.model, settings.api_key())
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send one chat-completions request and return the reply text.
    /// `json_mode` asks the model for a JSON object.
    pub async fn complete(&self, messages: &[ChatMessage], json_mode: bool) -> CostbookResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            let hint = if self.api_key_env.is_empty() {
                String::new()
            } else {
                format!("; set {}", self.api_key_env)
            };
            CostbookError::Assistant(format!("No API key configured{}", hint))
        })?;

        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        debug!(endpoint = %self.endpoint, model = %self.model, messages = messages.len(), "sending chat request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CostbookError::Assistant(format!(
                "Model API returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CostbookError::Assistant("Empty response from model".into()))?;

        Ok(content)
    }
}
