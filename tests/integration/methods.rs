//! Method lifecycle: lazy sends, validation, encodings, errors, cache keys.

use super::common::{client_for, CreateUser, GetUser, Profile, SearchUsers};
use restkit::client::{CacheStore, MemoryCache};
use restkit::{ErrorKind, PostParamsMode, RestMethod};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Address {
    city: String,
}

#[tokio::test]
async fn test_lazy_reads_share_one_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "Ada",
            "address": {"city": "London"},
            "roles": ["admin", "dev"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut method = RestMethod::new(&client, GetUser { id: 42 });

    assert_eq!(method.response_get("name").await.unwrap(), Some(&json!("Ada")));
    assert_eq!(method.response_get("roles.1").await.unwrap(), Some(&json!("dev")));
    let address: Option<Address> = method.response_as("address").await.unwrap();
    assert_eq!(
        address,
        Some(Address {
            city: "London".into()
        })
    );
    assert_eq!(method.response_status().await.unwrap(), 200);
    assert_eq!(
        method.response_or("missing.key", json!("fallback")).await.unwrap(),
        json!("fallback")
    );
}

#[tokio::test]
async fn test_explicit_send_refreshes_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": 1})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut method = RestMethod::new(&client, GetUser { id: 1 });

    assert_eq!(method.response_get("version").await.unwrap(), Some(&json!(1)));
    method.send().await.unwrap();
    assert_eq!(method.cached_response(), Some(&json!({"version": 2})));
}

#[tokio::test]
async fn test_query_validation_and_flattening() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("q", "ada"))
        .and(query_param("page", "2"))
        .and(query_param("filter[active]", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let mut invalid = RestMethod::new(&client, SearchUsers);
    invalid.add_query_param("page", 0);
    let err = invalid.send().await.unwrap_err();
    let errors = err.validation_errors().expect("validation errors");
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["page", "q"]);
    assert!(!invalid.is_sent());

    let mut valid = RestMethod::new(&client, SearchUsers);
    valid
        .add_query_param("q", "ada")
        .add_query_param("page", 2)
        .add_query_param("filter", json!({"active": true}));
    assert_eq!(valid.response_get("total").await.unwrap(), Some(&json!(1)));
}

#[tokio::test]
async fn test_post_param_encodings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Zoë", "email": "zoe@example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("name=Zo%C3%AB&email=zoe%40example.com"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 8})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let expected = [
        (PostParamsMode::Json, 7),
        (PostParamsMode::JsonUnescapedUnicode, 7),
        (PostParamsMode::Form, 8),
    ];
    for (mode, id) in expected {
        let mut method = RestMethod::new(&client, CreateUser { mode });
        method
            .add_post_param("name", "Zoë")
            .add_post_param("email", "zoe@example.com");
        assert_eq!(method.response_get("id").await.unwrap(), Some(&json!(id)));
        assert_eq!(method.response_status().await.unwrap(), 201);
    }
}

#[tokio::test]
async fn test_post_validation_blocks_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut method = RestMethod::new(
        &client,
        CreateUser {
            mode: PostParamsMode::Json,
        },
    );
    method
        .add_post_param("name", "x".repeat(65))
        .add_post_param("email", "not-an-email");

    let err = method.response().await.unwrap_err();
    assert!(err.is_validation_error());
    let errors = err.validation_errors().expect("validation errors");
    assert!(errors.get("name").is_some());
    assert!(errors.get("email").is_some());
}

#[tokio::test]
async fn test_handle_response_normalizes_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_name": "ada",
            "is_admin": "true",
            "home-address": {"zip_code": "N1"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut method = RestMethod::new(&client, Profile);

    assert_eq!(
        method.response().await.unwrap(),
        &json!({
            "userName": "ada",
            "isAdmin": true,
            "homeAddress": {"zipCode": "N1"},
            "isActive": false
        })
    );
}

#[tokio::test]
async fn test_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "gone"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/503"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/304"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let mut missing = RestMethod::new(&client, GetUser { id: 404 });
    let err = missing.send().await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!missing.is_sent());

    let mut down = RestMethod::new(&client, GetUser { id: 503 });
    let err = down.send().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(matches!(err.kind, ErrorKind::Http { ref body, .. } if body == "maintenance"));
    assert!(!down.is_sent());

    let mut unchanged = RestMethod::new(&client, GetUser { id: 304 });
    let err = unchanged.send().await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidResponse { status: 304 }));
    assert!(unchanged.is_sent());
    assert_eq!(unchanged.cached_status(), Some(304));
}

#[tokio::test]
async fn test_missing_base_url() {
    let client = restkit::RestClient::new(restkit::ClientConfig::default())
        .unwrap()
        .with_name("Orphan");
    let mut method = RestMethod::new(&client, GetUser { id: 1 });

    let err = method.response().await.unwrap_err();
    assert_eq!(err.to_string(), "Base URL not defined for client [Orphan]");
}

#[tokio::test]
async fn test_cache_key_and_clear() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let store = MemoryCache::new();

    let first = RestMethod::new(&client, GetUser { id: 1 });
    let second = RestMethod::new(&client, GetUser { id: 2 });
    assert_ne!(first.cache_key(), second.cache_key());
    assert_eq!(first.cache_key(), RestMethod::new(&client, GetUser { id: 1 }).cache_key());
    assert!(first.cache_key().ends_with("common-GetUser-1"));

    store.put(&first.cache_key(), json!({"name": "Ada"}), None);
    store.put(&second.cache_key(), json!({"name": "Bob"}), None);
    assert!(first.clear_cache(&store));
    assert!(store.get(&first.cache_key()).is_none());
    assert!(store.get(&second.cache_key()).is_some());
}
