//! One client shared by concurrent methods.

use std::sync::Arc;

use super::common::{client_for, GetUser};
use restkit::{BearerToken, RestMethod};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_client_across_tasks() {
    let server = MockServer::start().await;
    for id in 1..=8u64 {
        Mock::given(method("GET"))
            .and(path(format!("/api/users/{id}")))
            .and(header("authorization", "Bearer shared"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server).with_auth(Arc::new(BearerToken::new("shared")));

    let handles: Vec<_> = (1..=8u64)
        .map(|id| {
            let client = client.clone();
            tokio::spawn(async move {
                let mut method = RestMethod::new(&client, GetUser { id });
                method.response_get("id").await.unwrap().cloned()
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        let id = handle.await.unwrap();
        assert_eq!(id, Some(json!(index as u64 + 1)));
    }

    // Per-request auth never touched the shared headers.
    assert!(client.headers().get("Authorization").is_none());
}

#[tokio::test]
async fn test_methods_borrow_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut first = RestMethod::new(&client, GetUser { id: 1 });
    let mut second = RestMethod::new(&client, GetUser { id: 2 });

    let (a, b) = tokio::join!(first.response_get("ok"), second.response_get("ok"));
    assert_eq!(a.unwrap(), Some(&json!(true)));
    assert_eq!(b.unwrap(), Some(&json!(true)));
}
