//! An adapter for local or OpenAI-compatible chat completion servers
//! (llama.cpp, LM Studio, Ollama's `/v1` endpoint and the like).

use crate::{errors::PromptError, providers::ai::AiProvider};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, warn};

/// Room for a full audit report; the JSON stages use far less.
const MAX_COMPLETION_TOKENS: u32 = 8192;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatReply,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Removes `<think>...</think>` blocks that reasoning models put ahead of the
/// answer, so the stage parsers see only the answer.
pub fn strip_reasoning(content: &str) -> Result<String, PromptError> {
    let re = Regex::new(r"(?s)<think>.*?</think>")?;
    Ok(re.replace_all(content, "").trim().to_string())
}

// --- Local Provider implementation ---

/// A provider for a local or OpenAI-compatible chat completions API.
#[derive(Clone, Debug)]
pub struct LocalAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
}

impl LocalAiProvider {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let request_body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            model: self.model.as_deref(),
            temperature: 0.0,
            max_tokens: MAX_COMPLETION_TOKENS,
            stream: false,
        };
        debug!(
            "[local] POST {} (model: {:?}, prompt chars: {})",
            self.api_url,
            self.model,
            system_prompt.len() + user_prompt.len()
        );

        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(format!("status {status}: {error_text}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;
        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PromptError::AiApi("response contained no choices".to_string()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!("[local] Completion hit the {MAX_COMPLETION_TOKENS}-token limit and may be cut off.");
        }

        strip_reasoning(choice.message.content.as_deref().unwrap_or_default())
    }
}
