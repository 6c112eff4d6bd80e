//! Endpoints and helpers shared by the integration tests.

use std::collections::HashMap;

use restkit::client::transform::{fix_booleans, fix_keys};
use restkit::client::{Rule, RuleSet};
use restkit::{ClientConfig, Endpoint, HttpMethod, PostParamsMode, RestClient};
use serde_json::Value;
use wiremock::MockServer;

/// A client pointed at the mock server, with no auth.
pub fn client_for(server: &MockServer) -> RestClient {
    RestClient::new(ClientConfig::default())
        .expect("client should build")
        .with_name("UsersApi")
        .with_base_url(format!("{}/api/", server.uri()))
}

pub struct GetUser {
    pub id: u64,
}

impl Endpoint for GetUser {
    fn url_path(&self) -> &str {
        "/users/{id}"
    }

    fn token_values(&self) -> HashMap<String, String> {
        HashMap::from([("id".to_string(), self.id.to_string())])
    }

    fn cache_key_suffix(&self) -> Vec<String> {
        vec![self.id.to_string()]
    }
}

pub struct SearchUsers;

impl Endpoint for SearchUsers {
    fn url_path(&self) -> &str {
        "users"
    }

    fn query_param_rules(&self) -> RuleSet {
        RuleSet::new()
            .parse_field("q", "required|string")
            .and_then(|rules| rules.parse_field("page", "integer|min:1"))
            .expect("rules should parse")
    }
}

pub struct CreateUser {
    pub mode: PostParamsMode,
}

impl Endpoint for CreateUser {
    fn url_path(&self) -> &str {
        "/users"
    }

    fn http_method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn post_params_mode(&self) -> PostParamsMode {
        self.mode
    }

    fn post_param_rules(&self) -> RuleSet {
        RuleSet::new()
            .field("name", [Rule::Required, Rule::String, Rule::Max(64.0)])
            .field("email", [Rule::Email])
    }
}

/// Unauthenticated endpoint.
pub struct Health;

impl Endpoint for Health {
    fn url_path(&self) -> &str {
        "/health"
    }

    fn auth_enabled(&self) -> bool {
        false
    }
}

/// Normalizes a snake_case body with string flags.
pub struct Profile;

impl Endpoint for Profile {
    fn url_path(&self) -> &str {
        "/profile"
    }

    fn handle_response(&self, body: Value) -> Value {
        match fix_keys(body) {
            Value::Object(mut map) => {
                fix_booleans(&mut map, &["isAdmin", "isActive"]);
                Value::Object(map)
            }
            other => other,
        }
    }
}
