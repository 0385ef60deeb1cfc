//! # Explanation Gateway
//!
//! Fetches a short explanation of a topic from a chat-completion API.
//!
//! The word limit requested by the user is turned into a token budget with
//! an empirical inflation factor. Since that budget is only an estimate, the
//! returned text is always cut down to the requested number of words.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{GenerationConfig, TOKEN_INFLATION_PERCENT};

/// Text generation backend
#[async_trait]
pub trait ExplanationGateway: Send + Sync {
    async fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String>;
}

/// `ceil(word_limit * 1.33)`, computed in integers
pub fn max_output_tokens(word_limit: u32) -> u32 {
    (word_limit * TOKEN_INFLATION_PERCENT).div_ceil(100)
}

pub fn build_prompt(topic: &str, word_limit: u32) -> String {
    format!(
        "Explain \"{topic}\" in clear, simple language for a student. \
         Use at most {word_limit} words."
    )
}

/// Keep the first `limit` whitespace-delimited words, joined by single spaces
///
/// Applying it twice gives the same result as applying it once.
pub fn truncate_words(text: &str, limit: usize) -> String {
    text.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completion client
#[derive(Debug, Clone)]
pub struct OpenAiExplainer {
    client: Client,
    config: GenerationConfig,
}

impl OpenAiExplainer {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ExplanationGateway for OpenAiExplainer {
    async fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: max_output_tokens,
        };

        debug!(model = %self.config.model, max_output_tokens, "Requesting chat completion");

        let response: ChatCompletionResponse = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Chat completion request failed")?
            .error_for_status()
            .context("Chat completion request rejected")?
            .json()
            .await
            .context("Chat completion response could not be parsed")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("Chat completion response contained no text"))
    }
}
