use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use immocheck_core::ImmoError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(ImmoError::MissingInput(msg.into()).into())
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<ImmoError>() {
            match e {
                ImmoError::NotInitialized => StatusCode::BAD_REQUEST,
                ImmoError::UnknownProperty(_)
                | ImmoError::RecordNotFound(_)
                | ImmoError::OccupantNotFound(_) => StatusCode::NOT_FOUND,
                ImmoError::MissingInput(_)
                | ImmoError::InvalidDuplicatePolicy(_)
                | ImmoError::InvalidLiability(_) => StatusCode::BAD_REQUEST,
                ImmoError::SheetUnavailable(_)
                | ImmoError::SheetWriteRejected(_)
                | ImmoError::Http(_) => StatusCode::BAD_GATEWAY,
                ImmoError::MissingSecret(_)
                | ImmoError::Io(_)
                | ImmoError::Yaml(_)
                | ImmoError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else if let Some(e) = self.0.downcast_ref::<gemini_agent::GeminiAgentError>() {
            match e {
                gemini_agent::GeminiAgentError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
                gemini_agent::GeminiAgentError::HttpStatus { .. }
                | gemini_agent::GeminiAgentError::Http(_)
                | gemini_agent::GeminiAgentError::NoModels
                | gemini_agent::GeminiAgentError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
                gemini_agent::GeminiAgentError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
