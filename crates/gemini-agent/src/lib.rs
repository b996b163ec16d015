//! `gemini-agent`: a small client for Gemini's `generateContent` endpoint.
//!
//! Only what condition parsing needs: one user turn, a JSON-only reply, and
//! decoding that reply into a [`ParsedCommand`]. Validation of the returned
//! field/operator/value is left to the caller.
//!
//! ```rust,ignore
//! use gemini_agent::GeminiClient;
//!
//! let client = GeminiClient::new(Some(key), "gemini-2.5-flash");
//! let parsed = client.parse_condition("alert me when close > 100", r#"{"Close":"95"}"#).await?;
//! println!("{} {} {}", parsed.spec.field, parsed.spec.operator, parsed.spec.value);
//! ```

pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{condition_prompt, GeminiClient, GEMINI_API_URL};
pub use error::GeminiError;
pub use types::{ParsedCommand, RawSpec, DEFAULT_ASSISTANT_MESSAGE};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, GeminiError>;
