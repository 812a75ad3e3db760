//! Application error types.
//!
//! These errors are serializable so the pages and the CLI can render them
//! as structured JSON as well as plain messages.

use serde::Serialize;
use thiserror::Error;

/// Application-level errors returned by the data sources, services and pages.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Requested resource not found.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// The bug has already been claimed by a reviewer.
    #[error("Bug already claimed: {bug_id}")]
    AlreadyClaimed { bug_id: String },

    /// The user cannot afford the reward.
    #[error("Insufficient points: {required} required, {available} available")]
    InsufficientPoints { required: i64, available: i64 },

    /// The reward has no stock left.
    #[error("Reward out of stock: {reward_id}")]
    OutOfStock { reward_id: String },

    /// Rewards backend returned an error response.
    #[error("API error: {message}")]
    Api {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },

    /// Network request failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Authentication failed or credentials invalid.
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Authentication token expired or revoked.
    #[error("Token expired: {message}")]
    AuthenticationExpired { message: String },

    /// Credential storage operation failed.
    #[error("Credential storage error: {message}")]
    CredentialStorage { message: String },

    /// Configuration value missing or malformed.
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: None,
        }
    }

    /// Create a not found error with ID.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn already_claimed(bug_id: impl Into<String>) -> Self {
        Self::AlreadyClaimed {
            bug_id: bug_id.into(),
        }
    }

    pub fn insufficient_points(required: i64, available: i64) -> Self {
        Self::InsufficientPoints {
            required,
            available,
        }
    }

    pub fn out_of_stock(reward_id: impl Into<String>) -> Self {
        Self::OutOfStock {
            reward_id: reward_id.into(),
        }
    }

    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status_code: None,
            endpoint: None,
        }
    }

    /// Create an API error with status code and endpoint.
    pub fn api_full(message: impl Into<String>, status_code: u16, endpoint: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status_code: Some(status_code),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an authentication expired error.
    pub fn authentication_expired(message: impl Into<String>) -> Self {
        Self::AuthenticationExpired {
            message: message.into(),
        }
    }

    /// Create a credential storage error.
    pub fn credential_storage(message: impl Into<String>) -> Self {
        Self::CredentialStorage {
            message: message.into(),
        }
    }

    /// Create a configuration error for a specific key.
    pub fn configuration(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an authentication expired error.
    pub fn is_authentication_expired(&self) -> bool {
        matches!(self, Self::AuthenticationExpired { .. })
    }

    /// HTTP status code carried by an API error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

// Conversions from common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network("Failed to connect to server")
        } else if err.is_status() {
            Self::api(format!("HTTP error: {}", err))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}
