use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::catalog::{Podcast, parse_catalog};

/// HTTP client used for the catalog request.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
  Client::builder()
    .timeout(Duration::from_secs(timeout_secs))
    .user_agent(concat!("podex/", env!("CARGO_PKG_VERSION")))
    .build()
    .context("Failed to build HTTP client")
}

/// Fetch the full podcast catalog from `url`.
pub async fn fetch_podcasts(client: &Client, url: &str) -> Result<Vec<Podcast>> {
  info!(url, "api: fetching catalog");
  let response = client.get(url).send().await.with_context(|| format!("Request to {} failed", url))?;

  let status = response.status();
  if !status.is_success() {
    warn!(url, status = status.as_u16(), "api: catalog request rejected");
    return Err(anyhow!("HTTP {}", status));
  }

  let body = response.text().await.context("Failed to read catalog response body")?;
  let podcasts = parse_catalog(&body).context("Catalog response is not a podcast list")?;
  info!(count = podcasts.len(), "api: catalog loaded");
  Ok(podcasts)
}
