//! HTTP-level tests for the Spacelift client, token exchange and blob
//! transport, served by a local wiremock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spacebridge::api::{
    ApiError, BlobError, BlobTransport, HttpBlobTransport, SpaceliftApi, SpaceliftClient,
    StateDownload,
};
use spacebridge::auth::{ApiKeyTokenProvider, AuthError, StaticTokenProvider, TokenProvider};
use spacebridge::core::config::AccountConfig;

fn client(server: &MockServer) -> SpaceliftClient {
    SpaceliftClient::new(&server.uri(), Arc::new(StaticTokenProvider::new("test-jwt"))).unwrap()
}

// =============================================================================
// GraphQL client
// =============================================================================

mod graphql_tests {
    use super::*;

    #[tokio::test]
    async fn sends_bearer_token_and_decodes_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer test-jwt"))
            .and(body_string_contains("spaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "spaces": [
                        {"id": "root", "name": "root", "description": null,
                         "parentSpace": null, "inheritEntities": false, "labels": null},
                        {"id": "platform-01H", "name": "platform", "description": "Platform",
                         "parentSpace": "root", "inheritEntities": true, "labels": ["team:infra"]}
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let spaces = client(&server).list_spaces().await.unwrap();

        assert_eq!(spaces.len(), 2);
        assert_eq!(spaces[0].description, "");
        assert!(spaces[0].labels.is_empty());
        assert_eq!(spaces[1].parent_space.as_deref(), Some("root"));
        assert_eq!(spaces[1].labels, vec!["team:infra"]);
    }

    #[tokio::test]
    async fn graphql_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"message": "stack not found"}, {"message": "ignored"}]
            })))
            .mount(&server)
            .await;

        let err = client(&server).lock_stack("missing").await.unwrap_err();
        assert_eq!(err, ApiError::GraphQl("stack not found".into()));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).list_stacks().await.unwrap_err();
        assert!(matches!(err, ApiError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).list_policies().await.unwrap_err();
        assert_eq!(err, ApiError::RateLimited);
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client(&server).list_contexts().await.unwrap_err();
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("bad gateway"));
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).list_spaces().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn upload_url_decodes_object_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("stateUploadUrl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"stateUploadUrl": {"url": "https://s3.example/obj", "objectId": "obj-1"}}
            })))
            .mount(&server)
            .await;

        let upload = client(&server).state_upload_url().await.unwrap();
        assert_eq!(upload.url, "https://s3.example/obj");
        assert_eq!(upload.object_id, "obj-1");
    }
}

// =============================================================================
// API key exchange
// =============================================================================

mod token_tests {
    use super::*;

    fn account(server: &MockServer) -> AccountConfig {
        AccountConfig {
            url: server.uri(),
            key_id: "01HKEY".into(),
            secret_key: "topsecret".into(),
        }
    }

    #[tokio::test]
    async fn exchanges_once_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("apiKeyUser"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"apiKeyUser": {"jwt": "minted-jwt"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ApiKeyTokenProvider::new(&account(&server)).unwrap();
        assert_eq!(provider.bearer_token().await.unwrap(), "minted-jwt");
        assert_eq!(provider.bearer_token().await.unwrap(), "minted-jwt");
        assert_eq!(provider.key_id(), "01HKEY");
    }

    #[tokio::test]
    async fn rejected_key_is_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"apiKeyUser": null}
            })))
            .mount(&server)
            .await;

        let provider = ApiKeyTokenProvider::new(&account(&server)).unwrap();
        let err = provider.bearer_token().await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(ref id) if id == "01HKEY"));
        assert!(!err.to_string().contains("topsecret"));
    }

    #[tokio::test]
    async fn client_uses_exchanged_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("apiKeyUser"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"apiKeyUser": {"jwt": "minted-jwt"}}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer minted-jwt"))
            .and(body_string_contains("stackLock("))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"stackLock": {"id": "vpc"}}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = SpaceliftClient::from_account(&account(&server)).unwrap();
        assert_eq!(client.key_id(), "01HKEY");
        client.lock_stack("vpc").await.unwrap();
        client.lock_stack("vpc").await.unwrap();
    }
}

// =============================================================================
// Blob transport
// =============================================================================

mod blob_tests {
    use super::*;

    const STATE: &str = "{\"version\":4,\"serial\":12}";

    #[tokio::test]
    async fn streams_download_into_upload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state/vpc.tfstate"))
            .respond_with(ResponseTemplate::new(200).set_body_string(STATE))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/upload/object-1"))
            .and(header("content-type", "application/json"))
            .and(header("content-length", STATE.len().to_string().as_str()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpBlobTransport::new().unwrap();
        let download = transport
            .open_download(&format!("{}/state/vpc.tfstate", server.uri()))
            .await
            .unwrap();
        assert_eq!(download.content_length(), Some(STATE.len() as u64));

        let bytes = transport
            .upload(&format!("{}/upload/object-1", server.uri()), download)
            .await
            .unwrap();
        assert_eq!(bytes, STATE.len() as u64);
    }

    #[tokio::test]
    async fn any_2xx_upload_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let transport = HttpBlobTransport::new().unwrap();
        let bytes = transport
            .upload(&server.uri(), StateDownload::from_bytes(STATE))
            .await
            .unwrap();
        assert_eq!(bytes, STATE.len() as u64);
    }

    #[tokio::test]
    async fn download_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("AccessDenied"))
            .mount(&server)
            .await;

        let transport = HttpBlobTransport::new().unwrap();
        let err = transport.open_download(&server.uri()).await.unwrap_err();
        match err {
            BlobError::Status {
                operation,
                status,
                message,
            } => {
                assert_eq!(operation, "download");
                assert_eq!(status, 403);
                assert_eq!(message, "AccessDenied");
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn upload_rejection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_string("SignatureDoesNotMatch"))
            .mount(&server)
            .await;

        let transport = HttpBlobTransport::new().unwrap();
        let err = transport
            .upload(&server.uri(), StateDownload::from_bytes(STATE))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::Status { status: 400, .. }));
    }
}

// =============================================================================
// Live Spacelift API tests (behind feature flag)
// =============================================================================

#[cfg(feature = "live_spacelift_tests")]
mod live_tests {
    use super::*;
    use spacebridge::core::config::Config;

    #[tokio::test]
    async fn live_list_spaces_includes_root() {
        let Ok(loaded) = Config::load(None) else {
            eprintln!("Skipping: configuration could not be loaded");
            return;
        };
        let Ok(account) = loaded.config.source() else {
            eprintln!("Skipping: SOURCE_SPACELIFT_* not set");
            return;
        };

        let client = SpaceliftClient::from_account(&account).unwrap();
        let spaces = client.list_spaces().await.unwrap();
        assert!(spaces.iter().any(|s| s.id == "root"));
    }
}
