// ABOUTME: The layers command - lists the layers the hosted service defines
// ABOUTME: Useful for choosing a --layers selection before a sync run

use anyhow::{Context, Result};

use crate::stores::{HttpRemoteStore, RemoteStore};

pub async fn layers(service_url: String, api_key: Option<String>) -> Result<()> {
    let remote = HttpRemoteStore::new(service_url, api_key)
        .context("Failed to create hosted service client")?;

    let layers = remote
        .list_layers()
        .await
        .context("Failed to list hosted layers")?;

    if layers.is_empty() {
        println!("The hosted service defines no layers.");
        return Ok(());
    }

    println!("Hosted layers ({}):", layers.len());
    for layer in layers {
        println!("  {}  {}", layer.name, layer.url);
    }
    Ok(())
}
