//! Auth strategies on the wire.

use std::sync::Arc;

use super::common::{client_for, GetUser, Health};
use restkit::auth::{ENV_AUTH_SECRET, ENV_AUTH_USER};
use restkit::{AuthConfig, BearerToken, RestMethod};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_bearer_from_config_section() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/1"))
        .and(header("authorization", "Bearer s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let strategy = AuthConfig::from_value(json!({"type": "bearer", "token": "s3cr3t"}))
        .unwrap()
        .into_strategy()
        .expect("bearer strategy");
    let client = client_for(&server).with_auth(strategy);

    let mut method = RestMethod::new(&client, GetUser { id: 1 });
    assert_eq!(method.response_get("id").await.unwrap(), Some(&json!(1)));
}

#[tokio::test]
async fn test_basic_from_env_lookup() {
    let server = MockServer::start().await;
    // "svc:hunter2"
    Mock::given(method("GET"))
        .and(header("authorization", "Basic c3ZjOmh1bnRlcjI="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let config = AuthConfig::from_lookup(|name| match name {
        ENV_AUTH_USER => Some("svc".to_string()),
        ENV_AUTH_SECRET => Some("hunter2".to_string()),
        _ => None,
    });
    let mut client = client_for(&server);
    client.set_auth(config.into_strategy());

    let mut method = RestMethod::new(&client, GetUser { id: 2 });
    method.send().await.unwrap();
}

#[tokio::test]
async fn test_auth_disabled_endpoint_sends_no_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_auth(Arc::new(BearerToken::new("s3cr3t")));
    let mut method = RestMethod::new(&client, Health);
    method.send().await.unwrap();

    let requests = server.received_requests().await.expect("request recording");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_authorize_persists_on_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .and(header("authorization", "Bearer s3cr3t"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).with_auth(Arc::new(BearerToken::new("s3cr3t")));
    client.authorize();
    assert_eq!(client.headers().get("Authorization"), Some("Bearer s3cr3t"));

    // Persisted headers go out even where per-request auth is disabled.
    let mut method = RestMethod::new(&client, Health);
    method.send().await.unwrap();
}

#[tokio::test]
async fn test_no_auth_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = AuthConfig::from_lookup(|_| None);
    assert!(config.into_strategy().is_none());

    let client = client_for(&server);
    let mut method = RestMethod::new(&client, GetUser { id: 3 });
    method.send().await.unwrap();

    let requests = server.received_requests().await.expect("request recording");
    assert!(!requests[0].headers.contains_key("authorization"));
}
