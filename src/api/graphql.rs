//! api::graphql
//!
//! Authenticated GraphQL channel to one Spacelift account.
//!
//! # Design
//!
//! Every request is a `POST {base}/graphql` with a `{query, variables}` body
//! and a bearer token obtained from a [`TokenProvider`]. Requests carry a
//! 30 second timeout. A GraphQL `errors` array on an otherwise successful
//! response is reported as [`ApiError::GraphQl`] with the first message.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::traits::ApiError;
use crate::auth::TokenProvider;

/// Timeout for query and mutation requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent header value for API requests.
pub const USER_AGENT_VALUE: &str = concat!("spacebridge/", env!("CARGO_PKG_VERSION"));

/// GraphQL endpoint for an account base URL.
pub fn endpoint(base_url: &str) -> String {
    format!("{}/graphql", base_url.trim_end_matches('/'))
}

/// Build the HTTP client used for GraphQL requests.
pub fn http_client() -> Result<Client, ApiError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::Network(e.to_string()))
}

/// GraphQL client bound to one account.
pub struct GraphqlClient {
    client: Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint)
            .field("key_id", &self.tokens.key_id())
            .finish_non_exhaustive()
    }
}

impl GraphqlClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint(base_url),
            tokens,
        })
    }

    /// API key id the client authenticates as.
    pub fn key_id(&self) -> &str {
        self.tokens.key_id()
    }

    /// Run a query and decode its `data` object.
    pub async fn query<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Value,
    ) -> Result<T, ApiError> {
        self.execute(document, variables).await
    }

    /// Run a mutation and decode its `data` object.
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Value,
    ) -> Result<T, ApiError> {
        self.execute(document, variables).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Value,
    ) -> Result<T, ApiError> {
        let token = self
            .tokens
            .bearer_token()
            .await
            .map_err(|e| ApiError::AuthFailed(e.to_string()))?;
        post_graphql(&self.client, &self.endpoint, Some(&token), document, variables).await
    }
}

/// GraphQL response wrapper.
#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

/// GraphQL error format.
#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Send one GraphQL request and decode the `data` object.
pub(crate) async fn post_graphql<T: DeserializeOwned>(
    client: &Client,
    endpoint: &str,
    bearer: Option<&str>,
    document: &str,
    variables: Value,
) -> Result<T, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    if let Some(token) = bearer {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, value);
    }

    let body = serde_json::json!({
        "query": document,
        "variables": variables,
    });

    let response = client
        .post(endpoint)
        .headers(headers)
        .json(&body)
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(response, status).await);
    }

    let result: GraphQlResponse<T> = response
        .json()
        .await
        .map_err(|e| ApiError::Decode(format!("failed to parse GraphQL response: {}", e)))?;

    if let Some(first) = result.errors.and_then(|errors| errors.into_iter().next()) {
        return Err(ApiError::GraphQl(first.message));
    }

    result
        .data
        .ok_or_else(|| ApiError::Decode("GraphQL response has no data".into()))
}

/// Map a non-success response to an error.
async fn error_from_response(response: Response, status: StatusCode) -> ApiError {
    let message = response
        .text()
        .await
        .ok()
        .map(|body| body.trim().to_string())
        .filter(|body| !body.is_empty())
        .unwrap_or_else(|| "Unknown error".to_string());

    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthFailed("invalid or expired token".into()),
        StatusCode::FORBIDDEN => ApiError::AuthFailed(format!("permission denied: {}", message)),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
        _ if status.is_server_error() => ApiError::Http {
            status: status.as_u16(),
            message: format!("Spacelift server error: {}", message),
        },
        _ => ApiError::Http {
            status: status.as_u16(),
            message,
        },
    }
}
