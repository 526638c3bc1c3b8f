//! Ticker lookup backed by the Gemini generative API.

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Request(String),

    #[error("lookup response was malformed")]
    MalformedResponse,

    #[error("lookup returned no usable symbol")]
    Empty,

    #[error("lookup is not configured")]
    NotConfigured,
}

/// Resolves a security description to a ticker symbol.
#[async_trait]
pub trait SymbolLookup: Send + Sync {
    async fn lookup(&self, description: &str) -> Result<String, LookupError>;
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}

/// [`SymbolLookup`] implementation over Google's Gemini API.
pub struct GeminiLookup {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl GeminiLookup {
    pub fn new(api_key: impl Into<String>) -> Result<Self, LookupError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LookupError::NotConfigured);
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LookupError::Request(e.to_string()))?;
        Ok(Self {
            client,
            api_url: env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key,
        })
    }

    /// Builds a lookup from `GEMINI_API_KEY`, or `NotConfigured` when unset.
    pub fn from_env() -> Result<Self, LookupError> {
        let key = env::var("GEMINI_API_KEY").map_err(|_| LookupError::NotConfigured)?;
        Self::new(key)
    }

    fn prompt(description: &str) -> String {
        format!(
            "What is the stock ticker symbol for this security: \"{}\"? \
             Respond with only the ticker symbol, or UNKNOWN if you cannot tell.",
            description
        )
    }
}

#[async_trait]
impl SymbolLookup for GeminiLookup {
    async fn lookup(&self, description: &str) -> Result<String, LookupError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": Self::prompt(description) }] }],
            "generationConfig": { "temperature": 0.1, "maxOutputTokens": 10 }
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Request(format!("HTTP {}", status)));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|_| LookupError::MalformedResponse)?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_uppercase())
            .ok_or(LookupError::MalformedResponse)?;

        if text.is_empty() || text == "UNKNOWN" {
            return Err(LookupError::Empty);
        }
        debug!("lookup '{}' resolved to '{}'", description, text);
        Ok(text)
    }
}
