use serde::Serialize;
use thiserror::Error;

/// One field-level problem found while validating a query string.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryIssue {
    pub field: String,
    pub message: String,
}

impl QueryIssue {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        QueryIssue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid query parameters")]
    InvalidQuery(Vec<QueryIssue>),

    #[error("Invalid Riot ID format. Use format: Name#TAG")]
    InvalidRiotId,

    #[error("Upstream rejected the API credential")]
    Unauthorized,

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Account lookup failed on every cluster")]
    AccountLookupFailed,

    #[error("RIOT_API_KEY is not configured")]
    ServerMisconfigured,

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl AppError {
    /// Stable machine-readable code carried in error responses and
    /// `error` stream events.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidQuery(_) => "invalid_query",
            AppError::InvalidRiotId => "invalid_riot_id",
            AppError::Unauthorized => "unauthorized",
            AppError::PlayerNotFound(_) => "not_found",
            AppError::AccountLookupFailed => "account_lookup_failed",
            AppError::ServerMisconfigured => "server_misconfigured",
            AppError::RateLimited => "rate_limited",
            AppError::ConfigError(_) => "config_error",
            AppError::HttpError(_) => "unknown_error",
            AppError::JsonError(_) => "unknown_error",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::HttpError(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::JsonError(e.to_string())
    }
}
