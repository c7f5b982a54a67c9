use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiAgentError {
    #[error("api key is missing or empty")]
    MissingApiKey,

    #[error("endpoint lists no model supporting generateContent")]
    NoModels,

    #[error("endpoint returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GeminiAgentError {
    /// Quota and server-side failures are worth one retry against the
    /// fallback model; everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeminiAgentError::HttpStatus { status, .. } => {
                *status == 429 || *status >= 500
            }
            GeminiAgentError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
