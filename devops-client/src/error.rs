//! Error types for orchestration operations
//!
//! `TransportError` covers a single HTTP call. `DevOpsError` is what every public
//! operation returns: transport failures plus the identity-resolution outcomes that
//! need to be distinguished by callers.

use devops_model::DescriptorError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by a single call through a `Transport`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The token was rejected.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Response body was not valid JSON.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Orchestration error types.
#[derive(Debug, Error)]
pub enum DevOpsError {
    /// A platform call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Zero or several identities matched where exactly one was required.
    #[error("Expected exactly one identity for {email}, found {matches}")]
    AmbiguousOrMissingIdentity {
        /// Email that was looked up.
        email: String,
        /// Number of identities returned.
        matches: usize,
    },

    /// A bind-pending identity was created but never became resolvable.
    #[error("Identity for {email} did not resolve after provisioning ({attempts} lookups)")]
    ProvisioningFailed {
        /// Email that was provisioned.
        email: String,
        /// Lookups performed after provisioning.
        attempts: u32,
    },

    /// A descriptor could not be parsed or derived.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    /// A response parsed as JSON but did not have the expected shape.
    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),

    /// Client configuration is incomplete.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for orchestration operations.
pub type DevOpsResult<T> = Result<T, DevOpsError>;

impl DevOpsError {
    /// Get a stable error code for logs and reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            DevOpsError::Transport(TransportError::AuthenticationFailed) => "AUTHENTICATION_FAILED",
            DevOpsError::Transport(_) => "TRANSPORT_ERROR",
            DevOpsError::AmbiguousOrMissingIdentity { .. } => "AMBIGUOUS_OR_MISSING_IDENTITY",
            DevOpsError::ProvisioningFailed { .. } => "PROVISIONING_FAILED",
            DevOpsError::InvalidDescriptor(_) => "INVALID_DESCRIPTOR",
            DevOpsError::InvalidResponse(_) => "INVALID_RESPONSE",
            DevOpsError::Config(_) => "CONFIG_ERROR",
        }
    }
}
