//! `gemini-agent` — blocking client for the `generateContent` model API.
//!
//! The ImmoCheck workflow needs exactly three things from the endpoint:
//! list the available models, pick one by a name hint, and send one prompt
//! (text plus an optional inline photo) for one free-text reply.
//!
//! ```text
//! GeminiConfig
//!     │
//!     ▼
//! GeminiClient::list_models   ← GET /models, keep generateContent-capable
//!     │
//!     ▼
//! GeminiClient::pick_model    ← name-hint match, else first listed
//!     │
//!     ▼
//! GeminiClient::generate      ← POST /models/{id}:generateContent
//! ```
//!
//! `diagnose` chains the three and retries once against the configured
//! fallback model when the endpoint answers with a quota or server error.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeminiClient, GeminiConfig};
pub use error::GeminiAgentError;
pub use types::{Diagnosis, DiagnoseRequest, InlineImage, ModelInfo};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, GeminiAgentError>;
