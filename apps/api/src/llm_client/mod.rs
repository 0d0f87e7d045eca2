//! LLM Client: the Model Gateway used by resume screening.
//!
//! Every extraction call goes through the `ModelGateway` trait so the
//! screening pipeline can run against a scripted gateway in tests.
//! `LlmClient` is the production implementation on the OpenAI Responses API.
//!
//! No retries: a failed call is terminal for that file.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Everything the gateway needs for one resume.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub filename: &'a str,
    /// Standard base64 of the raw PDF bytes.
    pub pdf_base64: &'a str,
    /// Requirement text followed by the output-shape instruction.
    pub prompt: &'a str,
}

/// A single call to the external language model. Implementations hold no
/// per-call state and are shared across concurrent calls.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Returns the raw text output of the model.
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: Vec<InputContent<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputContent<'a> {
    InputFile { filename: String, file_data: String },
    InputText { text: &'a str },
}

#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl ResponsesResponse {
    /// Concatenates every `output_text` block of every message item.
    pub fn output_text(&self) -> Option<String> {
        let text: String = self
            .output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|block| block.block_type == "output_text")
            .filter_map(|block| block.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Process-wide gateway handle. Cheap to clone; the underlying reqwest
/// client pools connections.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, LlmError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, request: &ExtractionRequest<'a>) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model: &self.model,
            input: vec![InputMessage {
                role: "user",
                content: vec![
                    InputContent::InputFile {
                        filename: format!("Processing resume: {}", request.filename),
                        file_data: format!("data:application/pdf;base64,{}", request.pdf_base64),
                    },
                    InputContent::InputText {
                        text: request.prompt,
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl ModelGateway for LlmClient {
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<String, LlmError> {
        let body = self.build_request(&request);

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: ResponsesResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                filename = request.filename,
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens,
                usage.output_tokens
            );
        }

        parsed.output_text().ok_or(LlmError::EmptyContent)
    }
}
