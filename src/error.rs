use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(eventparser::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(eventparser::config))]
    Config(String),

    #[error("{0}")]
    #[diagnostic(code(eventparser::invalid_request))]
    InvalidRequest(String),

    #[error("{0}")]
    #[diagnostic(code(eventparser::fetch))]
    Fetch(String),

    #[error("Failed to fetch calendar: {0}")]
    #[diagnostic(code(eventparser::calendar))]
    Calendar(String),

    #[error("Gemini API error: {message}")]
    #[diagnostic(code(eventparser::llm))]
    Llm { status: u16, message: String },

    #[error("GEMINI_API_KEY is not configured on the server")]
    #[diagnostic(code(eventparser::missing_api_key))]
    MissingApiKey,

    #[error(transparent)]
    #[diagnostic(code(eventparser::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(eventparser::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(eventparser::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// HTTP status reported to API clients for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Fetch(_) | Error::Calendar(_) => StatusCode::BAD_GATEWAY,
            Error::Llm { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create upstream fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create calendar feed errors
pub fn calendar_error(message: &str) -> Error {
    Error::Calendar(message.to_string())
}

/// Helper to create LLM errors
pub fn llm_error(status: u16, message: &str) -> Error {
    Error::Llm {
        status,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::InvalidRequest("Invalid URL".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(fetch_error("boom").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(calendar_error("boom").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            Error::MissingApiKey.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_llm_status_passthrough() {
        assert_eq!(llm_error(429, "quota").status(), StatusCode::TOO_MANY_REQUESTS);
        // A success code from upstream can't describe a failure
        assert_eq!(llm_error(200, "odd").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(llm_error(42, "bogus").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(llm_error(400, "bad key").to_string(), "Gemini API error: bad key");
    }
}
