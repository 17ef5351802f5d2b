//! Key management operations.
//!
//! This module provides the KeysClient for creating, inspecting and moving
//! customer master keys through their lifecycle, listing them page by page,
//! and reading the project's key quotas.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::executor::ApiRequest;
use crate::pagination::{ListPage, PagedList, Pager};
use crate::state::{KeyTransition, ResourceFamily};
use crate::types::{CreateKeyRequest, Key, ListOptions, Quota, lenient_bool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "kms";

/// Shortest deletion window the provider accepts, in days.
pub const MIN_PENDING_DAYS: u32 = 7;
/// Longest deletion window the provider accepts, in days.
pub const MAX_PENDING_DAYS: u32 = 1096;

/// Client for key management operations.
///
/// Access via `client.keys()`.
#[derive(Debug, Clone)]
pub struct KeysClient {
    client: Client,
}

#[derive(Serialize)]
struct KeyIdBody<'a> {
    key_id: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyResponse {
    Wrapped { key_info: Key },
    Bare(Key),
}

impl KeyResponse {
    fn into_key(self) -> Key {
        match self {
            KeyResponse::Wrapped { key_info } => key_info,
            KeyResponse::Bare(key) => key,
        }
    }
}

impl KeysClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    fn path(&self, action: &str) -> String {
        format!(
            "/v1.0/{}/kms/{}",
            self.client.credential().project_id(),
            action
        )
    }

    /// Create a new key.
    ///
    /// Not idempotent: every successful call creates a key, and this method
    /// never retries. The new key starts out `Enabled`; a response reporting
    /// any other known state fails with [`Error::Protocol`].
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use hwcloud::{Client, CreateKeyRequest, Credential};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
    ///     let client = Client::new(cred)?;
    ///
    ///     let key = client
    ///         .keys()
    ///         .create(CreateKeyRequest::new("case1").with_description("desc"))
    ///         .await?;
    ///     println!("Created key: {} ({})", key.alias, key.id);
    ///     Ok(())
    /// }
    /// ```
    pub async fn create(&self, request: CreateKeyRequest) -> Result<Key> {
        request.validate()?;

        #[derive(Deserialize)]
        struct Response {
            key_info: serde_json::Value,
        }

        let api = ApiRequest::post_json(SERVICE, self.path("create-key"), &request)?;
        let response: Response = self.client.executor.execute(api).await?;

        let mut info = response.key_info;
        if let serde_json::Value::Object(map) = &mut info {
            map.entry("key_alias")
                .or_insert_with(|| request.alias.clone().into());
            if let Some(description) = &request.description {
                map.entry("key_description")
                    .or_insert_with(|| description.clone().into());
            }
            map.entry("key_state").or_insert_with(|| {
                ResourceFamily::Key.initial_state().as_str().into()
            });
        }
        let key: Key = serde_json::from_value(info)?;
        ResourceFamily::Key.check(&key.state)?;
        let initial = ResourceFamily::Key.initial_state();
        if key.state != initial && !key.state.is_unknown() {
            return Err(Error::Protocol(format!(
                "create reported state {}, expected {initial}",
                key.state
            )));
        }
        Ok(key)
    }

    /// Get a key by ID.
    ///
    /// Fails with [`Error::NotFound`] if the provider reports no such key.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use hwcloud::{Client, Credential};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
    ///     let client = Client::new(cred)?;
    ///
    ///     let key = client.keys().get("0d0466b0-e727-4d9c-b35d-f84bb474a37f").await?;
    ///     println!("Key: {} ({})", key.alias, key.state);
    ///     Ok(())
    /// }
    /// ```
    pub async fn get(&self, key_id: &str) -> Result<Key> {
        validate_id(key_id)?;
        let api = ApiRequest::post_json(SERVICE, self.path("describe-key"), &KeyIdBody { key_id })?;
        let response: KeyResponse = self.client.executor.execute(api).await?;
        let key = response.into_key();
        ResourceFamily::Key.check(&key.state)?;
        Ok(key)
    }

    /// Enable a key. Enabling an enabled key is accepted as a no-op.
    pub async fn enable(&self, key_id: &str) -> Result<Key> {
        self.transition(key_id, KeyTransition::Enable, None).await
    }

    /// Disable a key. Disabling a disabled key is accepted as a no-op.
    pub async fn disable(&self, key_id: &str) -> Result<Key> {
        self.transition(key_id, KeyTransition::Disable, None).await
    }

    /// Schedule a key for deletion after `pending_days`.
    ///
    /// `pending_days` must lie in `[7, 1096]`; anything else fails with
    /// [`Error::Validation`] without contacting the provider.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use hwcloud::{Client, Credential};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
    ///     let client = Client::new(cred)?;
    ///
    ///     let key = client.keys().schedule_deletion("key-id", 7).await?;
    ///     println!("Deletion scheduled: {:?}", key.scheduled_deletion_date);
    ///     Ok(())
    /// }
    /// ```
    pub async fn schedule_deletion(&self, key_id: &str, pending_days: u32) -> Result<Key> {
        if !(MIN_PENDING_DAYS..=MAX_PENDING_DAYS).contains(&pending_days) {
            return Err(Error::Validation(format!(
                "pending days must be between {MIN_PENDING_DAYS} and {MAX_PENDING_DAYS}, got {pending_days}"
            )));
        }
        self.transition(key_id, KeyTransition::ScheduleDeletion, Some(pending_days))
            .await
    }

    /// Cancel a scheduled deletion. The key comes back `Disabled`.
    pub async fn cancel_deletion(&self, key_id: &str) -> Result<Key> {
        self.transition(key_id, KeyTransition::CancelDeletion, None)
            .await
    }

    async fn transition(
        &self,
        key_id: &str,
        transition: KeyTransition,
        pending_days: Option<u32>,
    ) -> Result<Key> {
        validate_id(key_id)?;

        #[derive(Serialize)]
        struct Body<'a> {
            key_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            pending_days: Option<String>,
        }

        let action = match transition {
            KeyTransition::Enable => "enable-key",
            KeyTransition::Disable => "disable-key",
            KeyTransition::ScheduleDeletion => "schedule-key-deletion",
            KeyTransition::CancelDeletion => "cancel-key-deletion",
        };
        let body = Body {
            key_id,
            pending_days: pending_days.map(|d| d.to_string()),
        };
        let api = ApiRequest::post_json(SERVICE, self.path(action), &body)?;
        let response: KeyResponse = self.client.executor.execute(api).await?;
        let key = response.into_key();

        ResourceFamily::Key.check(&key.state)?;
        transition.check_reported(&key.state)?;
        Ok(key)
    }

    /// List one page of keys.
    ///
    /// Use [`crate::advance`] with the returned page to request the next
    /// one, or [`KeysClient::pages`] to iterate.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use hwcloud::{Client, Credential, ListOptions, ResourceState, advance};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
    ///     let client = Client::new(cred)?;
    ///
    ///     let mut options = ListOptions::new()
    ///         .with_limit(2)
    ///         .with_state_filter(ResourceState::Enabled);
    ///     loop {
    ///         let page = client.keys().list(&options).await?;
    ///         for key in &page.items {
    ///             println!("{}", key.id);
    ///         }
    ///         match advance(&page, &options) {
    ///             Some(next) => options = next,
    ///             None => break,
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn list(&self, options: &ListOptions) -> Result<ListPage<Key>> {
        options.validate(ResourceFamily::Key)?;

        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            limit: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            marker: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            key_state: Option<&'a str>,
        }

        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            key_details: Vec<Key>,
            #[serde(default)]
            next_marker: Option<String>,
            #[serde(default, deserialize_with = "lenient_bool")]
            truncated: bool,
        }

        let body = Body {
            limit: options.limit.map(|l| l.to_string()),
            marker: options.marker.as_deref(),
            key_state: options.state_filter.as_ref().map(|s| s.as_str()),
        };
        let api = ApiRequest::post_json(SERVICE, self.path("list-keys"), &body)?;
        let response: Response = self.client.executor.execute(api).await?;

        for key in &response.key_details {
            ResourceFamily::Key.check(&key.state)?;
        }
        ListPage::new(response.key_details, response.truncated, response.next_marker)
    }

    /// Lazily iterate over all pages matching `options`.
    pub fn pages(&self, options: ListOptions) -> Pager<KeysClient> {
        Pager::new(self.clone(), options)
    }

    /// Key quotas of the project, in provider order.
    pub async fn quotas(&self) -> Result<Vec<Quota>> {
        #[derive(Deserialize)]
        struct Response {
            quotas: Quotas,
        }

        #[derive(Deserialize)]
        struct Quotas {
            resources: Vec<Quota>,
        }

        let api = ApiRequest::get(SERVICE, self.path("user-quotas"));
        let response: Response = self.client.executor.execute(api).await?;
        Ok(response.quotas.resources)
    }

    /// Number of keys created in the project.
    pub async fn created_amount(&self) -> Result<u64> {
        #[derive(Deserialize)]
        struct Response {
            instance_num: u64,
        }

        let api = ApiRequest::get(SERVICE, self.path("user-instances"));
        let response: Response = self.client.executor.execute(api).await?;
        Ok(response.instance_num)
    }
}

#[async_trait]
impl PagedList for KeysClient {
    type Item = Key;

    async fn list_page(&self, options: &ListOptions) -> Result<ListPage<Key>> {
        self.list(options).await
    }
}

fn validate_id(key_id: &str) -> Result<()> {
    if key_id.trim().is_empty() {
        return Err(Error::Validation("key id must not be empty".to_string()));
    }
    Ok(())
}
