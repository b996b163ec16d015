use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GOOGLE_API_KEY is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gemini reply had no text candidate")]
    EmptyReply,

    #[error("Invalid JSON from Gemini: {source}\n  text: {text}")]
    InvalidJson {
        text: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Gemini response missing spec")]
    MissingSpec,
}
