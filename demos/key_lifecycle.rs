//! Key lifecycle walkthrough.
//!
//! Creates a key, schedules and cancels its deletion, re-enables it, lists
//! the enabled keys page by page and prints the project's key quotas.
//!
//! Run with:
//! ```bash
//! HWCLOUD_AK=... HWCLOUD_SK=... HWCLOUD_REGION=cn-north-1 \
//! HWCLOUD_PROJECT_ID=... HWCLOUD_DOMAIN=... \
//! RUST_LOG=hwcloud=debug cargo run --example key_lifecycle
//! ```

use hwcloud::{Client, ClientConfig, CreateKeyRequest, Credential, ListOptions, ResourceState};

fn env(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    std::env::var(name).map_err(|_| format!("{name} environment variable required").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let credential = Credential::new(
        env("HWCLOUD_AK")?,
        env("HWCLOUD_SK")?,
        env("HWCLOUD_REGION")?,
        env("HWCLOUD_PROJECT_ID")?,
        env("HWCLOUD_DOMAIN")?,
    );
    let client = Client::with_config(credential, ClientConfig::new().with_language("en-us"))?;
    let keys = client.keys();

    println!("Creating a new key...");
    let alias = format!("SDK-{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let key = keys
        .create(CreateKeyRequest::new(alias).with_description("created by the lifecycle demo"))
        .await?;
    println!("  ID:    {}", key.id);
    println!("  Alias: {}", key.alias);
    println!("  State: {}", key.state);

    let key = keys.schedule_deletion(&key.id, 7).await?;
    println!("\nScheduled deletion: {}", key.state);

    let key = keys.cancel_deletion(&key.id).await?;
    println!("Cancelled deletion: {}", key.state);

    let key = keys.enable(&key.id).await?;
    println!("Re-enabled:         {}", key.state);

    println!("\nEnabled keys:");
    let options = ListOptions::new()
        .with_limit(10)
        .with_state_filter(ResourceState::Enabled);
    let mut pager = keys.pages(options).with_max_pages(100);
    while let Some(page) = pager.next_page().await {
        for k in page?.items {
            println!("  {} {}", k.id, k.alias);
        }
    }

    println!("\nQuotas:");
    for quota in keys.quotas().await? {
        println!(
            "  {:<14} {:>4} / {}",
            quota.resource_type.as_str(),
            quota.used,
            quota.quota_limit
        );
    }
    println!("Keys created: {}", keys.created_amount().await?);

    // Leave the demo key scheduled for deletion.
    keys.schedule_deletion(&key.id, 7).await?;
    Ok(())
}
