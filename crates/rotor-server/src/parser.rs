use async_trait::async_trait;
use gemini_agent::{GeminiClient, GeminiError, ParsedCommand};
use rotor_core::condition::ConditionSpec;
use rotor_core::parser::{ConditionParser, ParseFailure, ParsedCondition};
use rotor_core::row::Row;

/// [`ConditionParser`] backed by Gemini. Every upstream or validation
/// problem becomes a [`ParseFailure`] so the command is recorded as failed.
pub struct GeminiParser {
    client: GeminiClient,
}

impl GeminiParser {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConditionParser for GeminiParser {
    async fn parse(&self, message: &str, row: &Row) -> Result<ParsedCondition, ParseFailure> {
        let row_json = serde_json::to_string(row)
            .map_err(|e| ParseFailure::new(format!("could not encode row: {e}")))?;
        let command = self
            .client
            .parse_condition(message, &row_json)
            .await
            .map_err(upstream_failure)?;
        normalize(command)
    }
}

fn upstream_failure(err: GeminiError) -> ParseFailure {
    match err {
        GeminiError::MissingApiKey => {
            ParseFailure::new("Condition parser is not configured: GOOGLE_API_KEY is not set")
        }
        GeminiError::InvalidJson { .. } => ParseFailure::new("Invalid JSON from Gemini"),
        other => ParseFailure::new(format!("Condition parser unavailable: {other}")),
    }
}

/// Validate the model's raw spec into a typed [`ConditionSpec`].
pub fn normalize(command: ParsedCommand) -> Result<ParsedCondition, ParseFailure> {
    let raw = command.spec;
    let spec = ConditionSpec::from_raw(&raw.field, &raw.operator, &raw.value, &raw.value_type)?;
    Ok(ParsedCondition {
        spec,
        assistant_message: command.assistant_message,
    })
}
