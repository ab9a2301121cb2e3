use anyhow::{anyhow, Result};
use log2::{debug, info};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::config::FetchConfig;

/// Fetch the raw content of a single page.
pub async fn fetch_page(url: Url, client: &Client, config: &FetchConfig) -> Result<String> {
    let response = client
        .get(url.clone())
        .timeout(Duration::from_secs(config.request_timeout_sec))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("Failed to fetch page {}: {}", url, response.status()));
    }

    let html = response.text().await?;
    info!("Loaded {} bytes from {}", html.len(), url);

    Ok(html)
}

/// [`fetch_page`] with up to `config.max_retries` further attempts.
/// Returns the error of the last attempt.
pub async fn fetch_with_retries(url: Url, client: &Client, config: &FetchConfig) -> Result<String> {
    let mut attempt = 0;
    loop {
        match fetch_page(url.clone(), client, config).await {
            Ok(html) => return Ok(html),
            Err(e) if attempt < config.max_retries => {
                attempt += 1;
                debug!("Attempt {} for {} failed: {}, retrying", attempt, url, e);
            }
            Err(e) => return Err(e),
        }
    }
}
