//! Type definitions for the SDK.
//!
//! This module contains the request, option and response types shared by
//! the resource clients.

use crate::error::{Error, Result};
use crate::state::{ResourceFamily, ResourceState};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A customer master key.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Key {
    /// Provider-assigned key identifier.
    #[serde(rename = "key_id")]
    pub id: String,
    /// Key alias.
    #[serde(rename = "key_alias", default)]
    pub alias: String,
    /// Key description.
    #[serde(rename = "key_description", default)]
    pub description: String,
    /// Lifecycle state.
    #[serde(rename = "key_state")]
    pub state: ResourceState,
    /// Region the key lives in.
    #[serde(default)]
    pub realm: String,
    /// Owning domain.
    #[serde(default)]
    pub domain_id: String,
    /// Creation time, milliseconds since the epoch.
    #[serde(rename = "creation_date", default)]
    pub created_at: Option<String>,
    /// Deletion time once deletion has been scheduled.
    #[serde(default)]
    pub scheduled_deletion_date: Option<String>,
    /// `"1"` for the provider's default key, `"0"` otherwise.
    #[serde(default)]
    pub default_key_flag: Option<String>,
}

/// Request to create a key.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CreateKeyRequest {
    /// Key alias: 1 to 255 characters of `[A-Za-z0-9:/_-]`.
    #[serde(rename = "key_alias")]
    pub alias: String,
    /// Optional description, at most 255 characters.
    #[serde(rename = "key_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateKeyRequest {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.alias.is_empty() || self.alias.len() > 255 {
            return Err(Error::Validation(
                "key alias must be 1 to 255 characters".to_string(),
            ));
        }
        let valid = self
            .alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '/' | '_' | '-'));
        if !valid {
            return Err(Error::Validation(format!(
                "key alias {:?} contains characters outside [A-Za-z0-9:/_-]",
                self.alias
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > 255 {
                return Err(Error::Validation(
                    "key description must be at most 255 characters".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Options for list operations.
///
/// # Example
///
/// ```rust
/// use hwcloud::{ListOptions, ResourceState};
///
/// let options = ListOptions::new()
///     .with_limit(2)
///     .with_state_filter(ResourceState::Enabled);
/// assert_eq!(options.limit, Some(2));
/// assert!(options.marker.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Page size. Must be positive when set.
    pub limit: Option<u32>,
    /// Opaque continuation marker from a previous page.
    pub marker: Option<String>,
    /// Only return resources in this state.
    pub state_filter: Option<ResourceState>,
}

impl ListOptions {
    /// Options for the first page, with no limit or filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for at most `limit` items per page.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after `marker`, as returned in [`crate::ListPage::next_marker`].
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Only list resources in `state`.
    pub fn with_state_filter(mut self, state: ResourceState) -> Self {
        self.state_filter = Some(state);
        self
    }

    /// Reject options that can never produce a valid listing of `family`.
    ///
    /// A state filter from another family is refused; `Unknown` filters pass
    /// through so newer provider states stay usable.
    pub(crate) fn validate(&self, family: ResourceFamily) -> Result<()> {
        if self.limit == Some(0) {
            return Err(Error::Validation("limit must be positive".to_string()));
        }
        if self.marker.as_deref() == Some("") {
            return Err(Error::Validation("marker must not be empty".to_string()));
        }
        if let Some(state) = &self.state_filter {
            if !family.allows(state) {
                return Err(Error::Validation(format!(
                    "state filter {state} does not apply to {family:?} resources"
                )));
            }
        }
        Ok(())
    }
}

/// Quota resource types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuotaResourceType {
    /// Customer master keys.
    Cmk,
    /// Grants per customer master key.
    GrantPerCmk,
    /// A value this client does not recognize, kept verbatim.
    Unknown(String),
}

impl QuotaResourceType {
    pub fn as_str(&self) -> &str {
        match self {
            QuotaResourceType::Cmk => "CMK",
            QuotaResourceType::GrantPerCmk => "GRANT_PER_CMK",
            QuotaResourceType::Unknown(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CMK" => QuotaResourceType::Cmk,
            "GRANT_PER_CMK" => QuotaResourceType::GrantPerCmk,
            _ => QuotaResourceType::Unknown(raw.to_string()),
        }
    }
}

impl fmt::Display for QuotaResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for QuotaResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QuotaResourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(QuotaResourceType::parse(&raw))
    }
}

/// Read-only quota snapshot.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Quota {
    #[serde(rename = "type")]
    pub resource_type: QuotaResourceType,
    #[serde(rename = "quota")]
    pub quota_limit: u64,
    pub used: u64,
}

/// A NAT gateway.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NatGateway {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ResourceState,
    #[serde(default)]
    pub router_id: String,
    #[serde(default)]
    pub internal_network_id: String,
    /// Gateway size, `"1"` (small) to `"4"` (extra large).
    #[serde(default)]
    pub spec: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub admin_state_up: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Accepts `true`, `false`, `"true"` and `"false"`.
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected boolean, got {other:?}"
            ))),
        },
    }
}
