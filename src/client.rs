//! Authenticated session handle.
//!
//! The main entry point for calling provider services. A [`Client`] is
//! built once from a [`Credential`] and handed to code that needs it; there
//! is no process-wide session.

use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::error::Result;
use crate::executor::Executor;
use crate::keys::KeysClient;
use crate::nat::NatClient;
use crate::signer::Signer;
use crate::transport::{ReqwestTransport, Transport};
use log::debug;
use std::sync::Arc;

/// Authenticated session.
///
/// Cheap to clone; clones share the same immutable credential, config and
/// transport, so one session can serve many concurrent tasks.
///
/// # Example
///
/// ```rust,no_run
/// use hwcloud::{Client, ClientConfig, CreateKeyRequest, Credential};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
///     let config = ClientConfig::new().with_language("en-us");
///     let client = Client::with_config(cred, config)?;
///
///     let key = client.keys().create(CreateKeyRequest::new("case1")).await?;
///     println!("created {} in state {}", key.id, key.state);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) executor: Executor,
}

impl Client {
    /// Create a client with default configuration.
    ///
    /// Fails with [`crate::Error::Credential`] if any credential field is empty.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_config(credential, ClientConfig::default())
    }

    /// Create a client with custom configuration and the default
    /// `reqwest` transport.
    pub fn with_config(credential: Credential, config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(&config)?;
        Self::with_transport(credential, config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(
        credential: Credential,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        credential.validate()?;
        debug!(
            "creating client for region {} project {}",
            credential.region(),
            credential.project_id()
        );
        Ok(Self {
            executor: Executor::new(Arc::new(credential), Arc::new(config), transport),
        })
    }

    /// Replace the request signer, e.g. to pin the signing time in tests.
    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.executor = self.executor.with_signer(signer);
        self
    }

    pub fn credential(&self) -> &Credential {
        self.executor.credential()
    }

    pub fn config(&self) -> &ClientConfig {
        self.executor.config()
    }

    /// Base URL used for `service`.
    pub fn endpoint(&self, service: &str) -> String {
        self.executor.endpoint(service)
    }

    /// Key management operations.
    pub fn keys(&self) -> KeysClient {
        KeysClient::new(self.clone())
    }

    /// NAT gateway operations.
    pub fn nat(&self) -> NatClient {
        NatClient::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn credential() -> Credential {
        Credential::new("AK", "SK", "cn-north-1", "proj", "dom")
    }

    #[test]
    fn test_client_new() {
        let client = Client::new(credential()).unwrap();
        assert_eq!(client.endpoint("kms"), "https://kms.cn-north-1.myhuaweicloud.com");
        assert_eq!(client.credential().project_id(), "proj");
    }

    #[test]
    fn test_client_with_config() {
        let client = Client::with_config(
            credential(),
            ClientConfig::new().with_endpoint("kms", "https://kms.custom.example"),
        )
        .unwrap();
        assert_eq!(client.endpoint("kms"), "https://kms.custom.example");
    }

    #[test]
    fn test_client_rejects_empty_credential() {
        let cred = Credential::new("AK", "SK", "", "proj", "dom");
        assert!(matches!(Client::new(cred), Err(Error::Credential(_))));
    }
}
