//! # hwcloud
//!
//! Rust client for cloud key-management (KMS) and networking REST services
//! authenticated with an access-key/secret-key pair.
//!
//! Every call is signed with `SDK-HMAC-SHA256`, sent once with a bounded
//! timeout, and decoded into typed results or a structured [`Error`].
//! Listings are paged through opaque provider markers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hwcloud::{Client, ClientConfig, CreateKeyRequest, Credential};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
//!     let config = ClientConfig::new().with_language("en-us");
//!     let client = Client::with_config(cred, config)?;
//!
//!     // Create a key and walk it through its lifecycle
//!     let key = client.keys().create(CreateKeyRequest::new("case1")).await?;
//!     let key = client.keys().schedule_deletion(&key.id, 7).await?;
//!     let key = client.keys().cancel_deletion(&key.id).await?;
//!     let key = client.keys().enable(&key.id).await?;
//!     println!("{} is {}", key.id, key.state);
//!     Ok(())
//! }
//! ```
//!
//! ## Pagination
//!
//! ```rust,no_run
//! use hwcloud::{Client, Credential, ListOptions, ResourceState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
//!     let client = Client::new(cred)?;
//!
//!     let options = ListOptions::new()
//!         .with_limit(2)
//!         .with_state_filter(ResourceState::Enabled);
//!     let keys = client.keys().pages(options).with_max_pages(50).collect_all().await?;
//!     println!("{} enabled keys", keys.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, Error>`:
//!
//! ```rust,no_run
//! use hwcloud::{Client, Credential, Error};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
//!     let client = Client::new(cred).expect("valid credential");
//!
//!     match client.keys().get("missing").await {
//!         Ok(key) => println!("Found {}", key.alias),
//!         Err(Error::NotFound { .. }) => println!("No such key"),
//!         Err(e) if e.is_retryable() => println!("Transient failure, retry later: {}", e),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod executor;
pub mod keys;
pub mod nat;
pub mod pagination;
pub mod signer;
pub mod state;
pub mod transport;
pub mod types;

// Re-export main types at the crate root
pub use client::Client;
pub use config::ClientConfig;
pub use credential::Credential;
pub use error::{Error, Result};
pub use pagination::{ListPage, PagedList, Pager, advance};
pub use signer::{SignedRequest, Signer};
pub use state::{KeyTransition, ResourceFamily, ResourceState};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

// Re-export types module for easy access
pub use types::{CreateKeyRequest, Key, ListOptions, NatGateway, Quota, QuotaResourceType};

// Key types must be usable across tasks and threads.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<Client>;
    let _ = assert_send_sync::<Credential>;
    let _ = assert_send_sync::<Error>;
};
