//! auth::errors
//!
//! Authentication error types for the API key exchange.
//!
//! # Design
//!
//! Error messages never contain the key secret or the issued token.
//!
//! # Example
//!
//! ```
//! use spacebridge::auth::AuthError;
//!
//! let err = AuthError::InvalidCredentials("01HKEY".to_string());
//! assert!(err.to_string().contains("01HKEY"));
//! ```

use thiserror::Error;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The account returned no user for this API key.
    #[error("API key '{0}' was rejected by Spacelift")]
    InvalidCredentials(String),

    /// The token exchange request failed.
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),
}
