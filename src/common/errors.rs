//! Error types for the application

use thiserror::Error;

/// Result type alias using our ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors produced by the allocation engine
///
/// Every variant is terminal for a single computation. The engine is pure and
/// deterministic, so retrying identical input yields the identical error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Malformed or out-of-range user input
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Empty or degenerate snapshot
    #[error("Insufficient market data: {0}")]
    InsufficientData(String),

    /// Every strike sits on one side of the anchor, so neutrality is impossible
    #[error("Asymmetric market: {0}")]
    AsymmetricMarket(String),

    /// No non-zero allocation keeps the worst-case loss within the risk cap
    #[error("Risk cap unsatisfiable: {0}")]
    RiskCapUnsatisfiable(String),
}

/// Main error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Event page could not be interpreted
    #[error("Page parsing error: {0}")]
    PageParse(String),

    /// Event not found
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Allocation engine rejected the snapshot or parameters
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Configuration(format!("Invalid URL: {}", err))
    }
}
