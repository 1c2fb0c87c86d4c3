//! auth::provider
//!
//! ApiKeyTokenProvider - TokenProvider implementation for Spacelift API keys.
//!
//! # Architecture
//!
//! The provider:
//! - Exchanges the API key id and secret for a JWT via the `apiKeyUser` mutation
//! - Caches the JWT in memory for [`TOKEN_TTL_MINUTES`]
//! - Exchanges again on the first call after the token nears expiry
//! - Never logs or returns the secret or the token in errors
//!
//! # Concurrency
//!
//! The read path only takes the cache read lock. Refresh goes through an
//! async mutex so concurrent callers do one exchange:
//!
//! 1. Check if refresh is needed
//! 2. If so, acquire the refresh lock
//! 3. Re-check after acquiring it (another task may have refreshed)
//! 4. Exchange if still needed
//!
//! [`TOKEN_TTL_MINUTES`]: super::token::TOKEN_TTL_MINUTES

use std::sync::RwLock;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::errors::AuthError;
use super::token::CachedToken;
use super::TokenProvider;
use crate::api::graphql::{endpoint, http_client, post_graphql};
use crate::core::config::AccountConfig;

const TOKEN_MUTATION: &str = r#"mutation GetToken($keyId: ID!, $keySecret: String!) {
  apiKeyUser(id: $keyId, secret: $keySecret) {
    jwt
  }
}"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
    api_key_user: Option<ApiKeyUser>,
}

#[derive(Deserialize)]
struct ApiKeyUser {
    jwt: String,
}

/// Token provider backed by a Spacelift API key.
pub struct ApiKeyTokenProvider {
    client: Client,
    endpoint: String,
    key_id: String,
    secret_key: String,
    cache: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
}

impl ApiKeyTokenProvider {
    /// Create a provider for one account.
    pub fn new(account: &AccountConfig) -> Result<Self, AuthError> {
        let client = http_client().map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint(&account.url),
            key_id: account.key_id.clone(),
            secret_key: account.secret_key.clone(),
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        })
    }

    /// Return the cached token if it is still good.
    fn cached(&self) -> Option<String> {
        let cache = self.cache.read().ok()?;
        cache
            .as_ref()
            .filter(|t| !t.needs_refresh(Utc::now()))
            .map(|t| t.jwt().to_string())
    }

    fn update_cache(&self, token: CachedToken) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(token);
        }
    }

    /// Exchange the API key for a new JWT.
    async fn exchange(&self) -> Result<CachedToken, AuthError> {
        let variables = serde_json::json!({
            "keyId": self.key_id,
            "keySecret": self.secret_key,
        });

        let data: TokenData = post_graphql(&self.client, &self.endpoint, None, TOKEN_MUTATION, variables)
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        let jwt = data
            .api_key_user
            .map(|u| u.jwt)
            .filter(|jwt| !jwt.is_empty())
            .ok_or_else(|| AuthError::InvalidCredentials(self.key_id.clone()))?;

        Ok(CachedToken::issued(jwt, Utc::now()))
    }
}

#[async_trait::async_trait]
impl TokenProvider for ApiKeyTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        let token = self.exchange().await?;
        let jwt = token.jwt().to_string();
        self.update_cache(token);
        Ok(jwt)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

// Custom Debug to avoid exposing the secret and token
impl std::fmt::Debug for ApiKeyTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyTokenProvider")
            .field("endpoint", &self.endpoint)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Provider that always returns the same token.
///
/// Useful for tests and for tokens minted outside SpaceBridge.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }

    fn key_id(&self) -> &str {
        "static"
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}
