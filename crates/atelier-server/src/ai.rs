//! [`TextModel`] backed by a hosted messages-style completion API.

use atelier_core::copywriting::{GenerationError, TextModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
  #[serde(default)]
  pub api_key: String,
  /// Used when neither the request nor the site settings name a model.
  #[serde(default = "default_model")]
  pub model:   String,
  #[serde(default = "default_api_url")]
  pub api_url: String,
}

fn default_model() -> String { "claude-sonnet-4-20250514".to_string() }

fn default_api_url() -> String { "https://api.anthropic.com/v1/messages".to_string() }

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
  model:      &'a str,
  max_tokens: u32,
  messages:   [UserMessage; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage {
  role:    &'static str,
  content: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
  #[serde(rename = "text")]
  Text { text: String },
  #[serde(other)]
  Other,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
  #[serde(default)]
  content: Vec<ContentBlock>,
}

impl MessagesResponse {
  /// All text blocks joined, or `None` if there were none.
  fn text(self) -> Option<String> {
    let text: String = self
      .content
      .into_iter()
      .filter_map(|block| match block {
        ContentBlock::Text { text } => Some(text),
        ContentBlock::Other => None,
      })
      .collect();
    Some(text).filter(|t| !t.trim().is_empty())
  }
}

#[derive(Debug, Clone)]
pub struct HostedModel {
  http:          Client,
  api_key:       String,
  api_url:       String,
  default_model: String,
}

impl HostedModel {
  pub fn new(config: &AiConfig) -> Result<Self, GenerationError> {
    if config.api_key.trim().is_empty() {
      return Err(GenerationError::MissingApiKey);
    }
    let http = Client::builder()
      .user_agent(concat!("atelier/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| GenerationError::Transport(e.to_string()))?;
    Ok(Self {
      http,
      api_key: config.api_key.clone(),
      api_url: config.api_url.clone(),
      default_model: config.model.clone(),
    })
  }

  pub fn default_model(&self) -> &str { &self.default_model }
}

impl TextModel for HostedModel {
  async fn generate(&self, model: &str, prompt: String) -> Result<Option<String>, GenerationError> {
    let request = MessagesRequest {
      model,
      max_tokens: MAX_TOKENS,
      messages: [UserMessage { role: "user", content: prompt }],
    };
    let res = self
      .http
      .post(&self.api_url)
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .json(&request)
      .send()
      .await
      .map_err(|e| GenerationError::Transport(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      return Err(GenerationError::Upstream { status: status.as_u16(), body });
    }
    let response: MessagesResponse = res
      .json()
      .await
      .map_err(|e| GenerationError::Malformed(e.to_string()))?;
    Ok(response.text())
  }
}
