//! # Client Error Types
//!
//! Error types for remote receipt-service operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │   Remote Rejection      │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  UnexpectedStatus       │ │
//! │  │  InvalidUrl     │  │  (send failure, │  │  UnexpectedResponse     │ │
//! │  │  ConfigLoad/Save│  │  timeout,cancel)│  │  (status + body)        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌───────────────────────────────────────────────┐│
//! │  │    Decoding     │  │          Known Business Outcomes              ││
//! │  │                 │  │                                               ││
//! │  │  Json           │  │  UserAlreadyRegistered  BadEmail  BadPhone    ││
//! │  │  Projection     │  │  (callers act on these, e.g. treat a repeat   ││
//! │  │                 │  │   signup as non-fatal)                        ││
//! │  └─────────────────┘  └───────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use fns_core::ProjectionError;
use thiserror::Error;

/// Result type alias for client operations.
pub type FnsResult<T> = Result<T, FnsError>;

/// Every failure a remote operation can return.
///
/// Nothing is recovered locally; each variant reaches the immediate caller.
#[derive(Debug, Error)]
pub enum FnsError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Service base URL cannot be used.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request could not be built or sent, or was cancelled / timed out.
    #[error("transport error: {0}")]
    Transport(String),

    // =========================================================================
    // Remote Rejection
    // =========================================================================
    /// Unexpected status; the body was not inspected.
    #[error("unexpected code {0}")]
    UnexpectedStatus(u16),

    /// Unexpected status with the raw response body.
    #[error("unexpected response {status}:{body}")]
    UnexpectedResponse { status: u16, body: String },

    // =========================================================================
    // Decoding Errors
    // =========================================================================
    /// The body is not the expected JSON schema.
    #[error("unable to decode response: {0}")]
    Json(#[from] serde_json::Error),

    /// The body decoded but could not be projected onto a `Receipt`.
    #[error("unable to decode response: {0}")]
    Projection(#[from] ProjectionError),

    // =========================================================================
    // Known Business Outcomes
    // =========================================================================
    /// Signup for a phone number that already has an account.
    #[error("user already registered")]
    UserAlreadyRegistered,

    /// Signup rejected the email address.
    #[error("bad email")]
    BadEmail,

    /// Signup rejected the phone number.
    #[error("bad phone")]
    BadPhone,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for FnsError {
    fn from(err: reqwest::Error) -> Self {
        FnsError::Transport(describe_chain(&err))
    }
}

/// Joins an error and every `source()` below it, outermost first.
///
/// reqwest keeps the useful part (refused, DNS, TLS) in the innermost cause.
fn describe_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }

    message
}

impl From<url::ParseError> for FnsError {
    fn from(err: url::ParseError) -> Self {
        FnsError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for FnsError {
    fn from(err: std::io::Error) -> Self {
        FnsError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for FnsError {
    fn from(err: toml::de::Error) -> Self {
        FnsError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for FnsError {
    fn from(err: toml::ser::Error) -> Self {
        FnsError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl FnsError {
    /// Returns true for outcomes callers handle explicitly rather than as failures.
    pub fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            FnsError::UserAlreadyRegistered | FnsError::BadEmail | FnsError::BadPhone
        )
    }

    /// Returns true if the request never got a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, FnsError::Transport(_))
    }

    /// Returns true if the body arrived but could not be decoded.
    pub fn is_decoding(&self) -> bool {
        matches!(self, FnsError::Json(_) | FnsError::Projection(_))
    }

    /// Returns the HTTP status of a remote rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            FnsError::UnexpectedStatus(status) => Some(*status),
            FnsError::UnexpectedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if repeating the same call may succeed.
    ///
    /// The client never retries on its own; this is for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            FnsError::Transport(_) => true,
            _ => self.status().is_some_and(|status| status >= 500),
        }
    }
}
