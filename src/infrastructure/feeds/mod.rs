pub mod fyers;

use crate::domain::error::DomainError;

#[derive(Debug)]
pub enum FeedError {
    /// HTTP or network error
    Network(String),
    /// Response parsing error
    Parse(String),
    /// API answered but reported a failure
    Api(String),
    /// Configuration error (missing credentials, etc.)
    Config(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::Network(msg) => write!(f, "Network error: {msg}"),
            FeedError::Parse(msg) => write!(f, "Parse error: {msg}"),
            FeedError::Api(msg) => write!(f, "API error: {msg}"),
            FeedError::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

impl From<FeedError> for DomainError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::Config(msg) => DomainError::Config(msg),
            other => DomainError::Provider(other.to_string()),
        }
    }
}
