use crate::client::{build_prompt, LlmClient};
use crate::error::{LlmError, Result};
use retriever_model::CodeFragment;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-3.5-turbo";

const EMBEDDING_API_URL: &str = "https://api.openai.com/v1/embeddings";
const EMBEDDING_MODEL: &str = "text-embedding-ada-002";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI client: chat completions for answers, the embeddings endpoint for
/// vectors. Bearer authentication.
pub struct OpenAiClient {
    api_key: Option<String>,
    http: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()?;
        Ok(Self { api_key, http })
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::NotConfigured("OpenAI"))
    }

    fn post(&self, url: &str, body: &serde_json::Value) -> Result<String> {
        let response = self
            .http
            .post(url)
            .bearer_auth(self.key()?)
            .json(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            log::error!("OpenAI API request failed: {} - {}", status, text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

impl LlmClient for OpenAiClient {
    fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn provider_name(&self) -> &str {
        "OpenAI (GPT-3.5 Turbo)"
    }

    fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        log::info!(
            "Generating {} embeddings using model {}",
            texts.len(),
            EMBEDDING_MODEL
        );

        let request = json!({ "model": EMBEDDING_MODEL, "input": texts });
        let body = self.post(EMBEDDING_API_URL, &request)?;

        let parsed: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(format!("no 'data' array: {e}")))?;
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn query_with_context(&self, query: &str, context: &[CodeFragment]) -> Result<String> {
        log::info!(
            "Sending query to OpenAI (context size: {} fragments)",
            context.len()
        );

        let prompt = build_prompt(query, context);
        let request = json!({
            "model": MODEL,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.7,
            "max_tokens": 2048,
        });

        let body = self.post(API_URL, &request)?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::MalformedResponse("no choice content in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_requires_a_non_empty_key() {
        assert!(!OpenAiClient::new(None).unwrap().is_available());
        assert!(OpenAiClient::new(Some("k".to_string())).unwrap().is_available());
    }
}
