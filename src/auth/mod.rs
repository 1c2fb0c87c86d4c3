//! auth - Spacelift API key authentication
//!
//! Spacelift issues short-lived JWTs in exchange for an API key id and
//! secret. This module performs that exchange and hands bearer tokens to the
//! GraphQL client.
//!
//! # Components
//!
//! - [`TokenProvider`] - Trait for providing bearer tokens to API clients
//! - [`ApiKeyTokenProvider`] - Exchanges an API key and caches the JWT
//! - [`StaticTokenProvider`] - Fixed token, for tests
//! - [`CachedToken`] - Token plus expiry
//!
//! # Security
//!
//! Secrets and tokens never appear in logs, error messages or debug output.
//! Types holding either implement a redacting `Debug`.
//!
//! # Example
//!
//! ```ignore
//! use spacebridge::auth::{ApiKeyTokenProvider, TokenProvider};
//!
//! let provider = ApiKeyTokenProvider::new(&account)?;
//! let token = provider.bearer_token().await?;
//! ```

mod errors;
mod provider;
mod token;

pub use errors::AuthError;
pub use provider::{ApiKeyTokenProvider, StaticTokenProvider};
pub use token::{CachedToken, EXPIRY_BUFFER_SECS, TOKEN_TTL_MINUTES};

/// Trait for providing bearer tokens to API clients.
///
/// # Implementation Notes
///
/// Implementors must:
/// - Handle token refresh transparently
/// - Never log or expose token values
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a valid bearer token, exchanging for a new one if necessary.
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// API key id this provider authenticates as. Safe to log.
    fn key_id(&self) -> &str;
}
