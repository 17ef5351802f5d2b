//! NAT gateway operations.
//!
//! NAT gateways belong to the network resource family: their status is one
//! of `Active`, `Error` or a `Pending*` state. Listing uses the same marker
//! pagination as keys; the provider signals more data through
//! `page_info.next_marker`.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::executor::ApiRequest;
use crate::pagination::{ListPage, PagedList, Pager};
use crate::state::ResourceFamily;
use crate::types::{ListOptions, NatGateway};
use async_trait::async_trait;
use serde::Deserialize;

const SERVICE: &str = "nat";

/// Client for NAT gateway operations.
///
/// Access via `client.nat()`.
#[derive(Debug, Clone)]
pub struct NatClient {
    client: Client,
}

impl NatClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get a NAT gateway by ID.
    pub async fn get(&self, gateway_id: &str) -> Result<NatGateway> {
        validate_id(gateway_id)?;

        #[derive(Deserialize)]
        struct Response {
            nat_gateway: NatGateway,
        }

        let api = ApiRequest::get(SERVICE, format!("/v2.0/nat_gateways/{gateway_id}"));
        let response: Response = self.client.executor.execute(api).await?;
        ResourceFamily::Network.check(&response.nat_gateway.status)?;
        Ok(response.nat_gateway)
    }

    /// List one page of NAT gateways.
    ///
    /// A status filter outside the network family fails with
    /// [`Error::Validation`] before any request is made.
    pub async fn list(&self, options: &ListOptions) -> Result<ListPage<NatGateway>> {
        options.validate(ResourceFamily::Network)?;

        #[derive(Deserialize)]
        struct Response {
            nat_gateways: Vec<NatGateway>,
            #[serde(default)]
            page_info: Option<PageInfo>,
        }

        #[derive(Deserialize)]
        struct PageInfo {
            #[serde(default)]
            next_marker: Option<String>,
        }

        let mut api = ApiRequest::get(SERVICE, "/v2.0/nat_gateways");
        if let Some(limit) = options.limit {
            api = api.query("limit", limit.to_string());
        }
        if let Some(marker) = &options.marker {
            api = api.query("marker", marker.as_str());
        }
        if let Some(status) = &options.state_filter {
            api = api.query("status", status.as_str());
        }

        let response: Response = self.client.executor.execute(api).await?;
        for gateway in &response.nat_gateways {
            ResourceFamily::Network.check(&gateway.status)?;
        }

        let next_marker = response
            .page_info
            .and_then(|p| p.next_marker)
            .filter(|m| !m.is_empty());
        ListPage::new(response.nat_gateways, next_marker.is_some(), next_marker)
    }

    /// Lazily iterate over all pages matching `options`.
    pub fn pages(&self, options: ListOptions) -> Pager<NatClient> {
        Pager::new(self.clone(), options)
    }
}

#[async_trait]
impl PagedList for NatClient {
    type Item = NatGateway;

    async fn list_page(&self, options: &ListOptions) -> Result<ListPage<NatGateway>> {
        self.list(options).await
    }
}

/// The id becomes one path segment, so it may not carry path or query syntax.
fn validate_id(gateway_id: &str) -> Result<()> {
    if gateway_id.trim().is_empty() {
        return Err(Error::Validation(
            "nat gateway id must not be empty".to_string(),
        ));
    }
    if gateway_id.contains(['/', '?', '#']) {
        return Err(Error::Validation(format!(
            "nat gateway id {gateway_id:?} must be a single path segment"
        )));
    }
    Ok(())
}
