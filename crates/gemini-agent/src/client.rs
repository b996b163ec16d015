use crate::error::GeminiError;
use crate::types::{GenerateRequest, GenerateResponse, ParsedCommand};
use crate::Result;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
const TEMPERATURE: f32 = 0.2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// A client without an API key is valid; every call then fails with
    /// [`GeminiError::MissingApiKey`].
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Send one prompt and return the text of the first candidate.
    pub async fn generate_json(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let body = GenerateRequest::json_prompt(prompt, TEMPERATURE);

        debug!(model = %self.model, "sending Gemini request");
        let started = Instant::now();
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %body, "Gemini request failed");
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse = response.json().await?;
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Gemini response received");
        reply.text().ok_or(GeminiError::EmptyReply)
    }

    /// Ask the model to turn a trading command into a structured comparison,
    /// using `row_json` (the current row as a JSON object) for field names.
    pub async fn parse_condition(&self, message: &str, row_json: &str) -> Result<ParsedCommand> {
        let text = self.generate_json(&condition_prompt(message, row_json)).await?;
        ParsedCommand::from_reply_text(&text)
    }
}

pub fn condition_prompt(message: &str, row_json: &str) -> String {
    format!(
        "You are a trading assistant. The user provides a natural language command. \
         Use the provided CSV row to map fields accurately. \
         Return JSON with: assistant_message (string), spec (object) where spec includes \
         field (string), operator (one of ==, !=, >, >=, <, <=, contains, starts_with, ends_with), \
         value (string), value_type (number|string). \n\n\
         User command: {message}\n\n\
         CSV row fields and values: {row_json}\n\n\
         Respond with JSON only."
    )
}
