use crate::error::GeminiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── generateContent request ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub response_mime_type: String,
}

impl GenerateRequest {
    /// Single user turn asking for a JSON-only reply.
    pub fn json_prompt(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

// ─── generateContent response ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ─── Parsed condition reply ───────────────────────────────────────────────

pub const DEFAULT_ASSISTANT_MESSAGE: &str = "Condition parsed.";

/// The comparison as the model phrased it. Every field is stringified;
/// validation happens on the caller's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSpec {
    pub field: String,
    pub operator: String,
    pub value: String,
    pub value_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub assistant_message: String,
    pub spec: RawSpec,
}

impl ParsedCommand {
    /// Decode the model's JSON text. Missing spec members become empty
    /// strings, a missing `value_type` becomes `"string"`, and non-string
    /// scalars are rendered as text.
    pub fn from_reply_text(text: &str) -> Result<Self, GeminiError> {
        let data: Value = serde_json::from_str(text).map_err(|source| GeminiError::InvalidJson {
            text: text.to_string(),
            source,
        })?;

        let spec = match data.get("spec") {
            Some(Value::Object(spec)) => spec,
            _ => return Err(GeminiError::MissingSpec),
        };
        let member = |key: &str, default: &str| match spec.get(key) {
            None | Some(Value::Null) => default.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let assistant_message = match data.get("assistant_message") {
            Some(Value::String(s)) => s.clone(),
            _ => DEFAULT_ASSISTANT_MESSAGE.to_string(),
        };

        Ok(Self {
            assistant_message,
            spec: RawSpec {
                field: member("field", ""),
                operator: member("operator", ""),
                value: member("value", ""),
                value_type: member("value_type", "string"),
            },
        })
    }
}
