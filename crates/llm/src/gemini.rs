use crate::client::{build_prompt, LlmClient};
use crate::error::{LlmError, Result};
use retriever_model::CodeFragment;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const MODEL: &str = "gemini-pro-latest";
const EMBEDDING_MODEL: &str = "embedding-001";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Google Gemini client: `generateContent` for answers,
/// `batchEmbedContents` for embeddings. The API key travels as a query
/// parameter.
pub struct GeminiClient {
    api_key: Option<String>,
    http: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    #[serde(default)]
    values: Vec<f32>,
}

impl GeminiClient {
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
            .ok_or(LlmError::NotConfigured("Gemini"))
    }

    fn post(&self, url: &str, body: &serde_json::Value) -> Result<String> {
        let response = self
            .http
            .post(url)
            .query(&[("key", self.key()?)])
            .json(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            log::error!("Gemini API request failed: {} - {}", status, text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

impl LlmClient for GeminiClient {
    fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn provider_name(&self) -> &str {
        "Google (Gemini Pro)"
    }

    fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        log::info!(
            "Generating {} embeddings using model {}",
            texts.len(),
            EMBEDDING_MODEL
        );

        let requests: Vec<serde_json::Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": format!("models/{EMBEDDING_MODEL}"),
                    "content": { "parts": [{ "text": text }] },
                })
            })
            .collect();

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{EMBEDDING_MODEL}:batchEmbedContents"
        );
        let body = self.post(&url, &json!({ "requests": requests }))?;

        let parsed: BatchEmbedResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(format!("no 'embeddings' array: {e}")))?;
        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn query_with_context(&self, query: &str, context: &[CodeFragment]) -> Result<String> {
        log::info!(
            "Sending query to Gemini (context size: {} fragments)",
            context.len()
        );

        let prompt = build_prompt(query, context);
        let request = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 2048 },
        });

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{MODEL}:generateContent"
        );
        let body = self.post(&url, &request)?;

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                LlmError::MalformedResponse("no candidate text in response".to_string())
            })
    }
}
