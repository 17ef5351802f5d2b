//! Shared fixtures: a stateful in-memory KMS provider served by wiremock.

#![allow(dead_code)]

use hwcloud::{Client, ClientConfig, Credential, KeyTransition, ResourceState};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header_exists, method, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const PROJECT_ID: &str = "0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e";
pub const REALM: &str = "cn-north-1";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn credential() -> Credential {
    Credential::new("AK-TEST", "SK-TEST", REALM, PROJECT_ID, "domain-test")
}

/// Client pointing every service at `server`.
pub fn client_for(server: &MockServer) -> Client {
    init_logging();
    let config = ClientConfig::new()
        .with_language("zh-cn")
        .with_endpoint("kms", server.uri())
        .with_endpoint("nat", server.uri());
    Client::with_config(credential(), config).unwrap()
}

pub fn kms_path(action: &str) -> String {
    format!("/v1.0/{PROJECT_ID}/kms/{action}")
}

#[derive(Debug, Clone)]
pub struct StoredKey {
    pub id: String,
    pub alias: String,
    pub description: String,
    pub state: String,
}

impl StoredKey {
    fn to_json(&self) -> Value {
        let scheduled = if self.state == "SCHEDULED_DELETION" {
            "1541739192000"
        } else {
            ""
        };
        json!({
            "key_id": self.id,
            "domain_id": "domain-test",
            "key_alias": self.alias,
            "key_description": self.description,
            "realm": REALM,
            "creation_date": "1541134392000",
            "scheduled_deletion_date": scheduled,
            "key_state": self.state,
            "default_key_flag": "0",
        })
    }
}

/// Fake key-management provider.
///
/// Keeps keys in creation order, enforces the provider's state rules and
/// pages listings with opaque `offset-N` markers. Requests that are not
/// signed never reach it (see [`FakeKms::mount`]).
#[derive(Debug, Clone, Default)]
pub struct FakeKms {
    keys: Arc<Mutex<Vec<StoredKey>>>,
}

impl FakeKms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with `count` keys in `state`, aliased `{prefix}-{i}`.
    pub fn seed(&self, prefix: &str, count: usize, state: &str) {
        let mut keys = self.keys.lock().unwrap();
        for i in 0..count {
            let id = format!("key-{:04}", keys.len());
            keys.push(StoredKey {
                id,
                alias: format!("{prefix}-{i}"),
                description: String::new(),
                state: state.to_string(),
            });
        }
    }

    pub fn keys(&self) -> Vec<StoredKey> {
        self.keys.lock().unwrap().clone()
    }

    /// Serve every signed KMS request from this fake.
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(path_regex(r"^/v1\.0/[^/]+/kms/.+$"))
            .and(header_exists("authorization"))
            .and(header_exists("x-sdk-date"))
            .and(header_exists("x-project-id"))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    fn handle(&self, action: &str, body: &Value) -> ResponseTemplate {
        let mut keys = self.keys.lock().unwrap();
        let key_id = body["key_id"].as_str().unwrap_or_default().to_string();

        match action {
            "create-key" => {
                let key = StoredKey {
                    id: format!("key-{:04}", keys.len()),
                    alias: body["key_alias"].as_str().unwrap_or_default().to_string(),
                    description: body["key_description"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string(),
                    state: "ENABLED".to_string(),
                };
                let json = key.to_json();
                keys.push(key);
                ok(json!({ "key_info": json }))
            }
            "describe-key" => match keys.iter().find(|k| k.id == key_id) {
                Some(key) => ok(json!({ "key_info": key.to_json() })),
                None => not_found(),
            },
            "enable-key" | "disable-key" | "schedule-key-deletion" | "cancel-key-deletion" => {
                let transition = match action {
                    "enable-key" => KeyTransition::Enable,
                    "disable-key" => KeyTransition::Disable,
                    "schedule-key-deletion" => KeyTransition::ScheduleDeletion,
                    _ => KeyTransition::CancelDeletion,
                };
                let Some(key) = keys.iter_mut().find(|k| k.id == key_id) else {
                    return not_found();
                };
                if transition == KeyTransition::ScheduleDeletion {
                    let days: u32 = body["pending_days"]
                        .as_str()
                        .and_then(|d| d.parse().ok())
                        .unwrap_or(0);
                    if !(7..=1096).contains(&days) {
                        return client_error("KMS.0204", "invalid pending_days");
                    }
                }
                let Some(next) = transition.apply(&ResourceState::parse(&key.state)) else {
                    return client_error("KMS.0205", "invalid key state");
                };
                key.state = next.as_str().to_string();
                ok(json!({ "key_info": key.to_json() }))
            }
            "list-keys" => {
                let limit = body["limit"]
                    .as_str()
                    .and_then(|l| l.parse::<usize>().ok())
                    .unwrap_or(1000);
                let offset = body["marker"]
                    .as_str()
                    .and_then(|m| m.strip_prefix("offset-"))
                    .and_then(|m| m.parse::<usize>().ok())
                    .unwrap_or(0);
                let filter = body["key_state"].as_str();

                let matching: Vec<&StoredKey> = keys
                    .iter()
                    .filter(|k| filter.is_none_or(|f| f == k.state.as_str()))
                    .collect();
                let page: Vec<&StoredKey> =
                    matching.iter().skip(offset).take(limit).copied().collect();
                let end = offset + page.len();
                let truncated = end < matching.len();

                let truncated_flag = if truncated { "true" } else { "false" };
                let mut response = json!({
                    "keys": page.iter().map(|k| k.id.clone()).collect::<Vec<_>>(),
                    "key_details": page.iter().map(|k| k.to_json()).collect::<Vec<_>>(),
                    "truncated": truncated_flag,
                });
                if truncated {
                    response["next_marker"] = json!(format!("offset-{end}"));
                }
                ok(response)
            }
            "user-quotas" => ok(json!({
                "quotas": {
                    "resources": [
                        { "type": "CMK", "used": keys.len(), "quota": 20 },
                        { "type": "grant_per_CMK", "used": 0, "quota": 100 }
                    ]
                }
            })),
            "user-instances" => ok(json!({ "instance_num": keys.len() })),
            _ => client_error("KMS.0001", "unsupported action"),
        }
    }
}

impl Respond for FakeKms {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let action = request
            .url
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let body: Value = if request.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&request.body).unwrap_or(Value::Null)
        };
        self.handle(&action, &body)
    }
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": { "error_code": "KMS.0207", "error_msg": "The key does not exist." }
    }))
}

fn client_error(code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "error": { "error_code": code, "error_msg": message }
    }))
}

/// Mount a one-off canned POST response for a KMS action.
pub async fn mount_kms_response(server: &MockServer, action: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(wiremock::matchers::path(kms_path(action)))
        .respond_with(response)
        .mount(server)
        .await;
}
