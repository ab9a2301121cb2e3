use std::sync::Arc;
use std::sync::atomic::Ordering;
use anyhow::Result;
use log2::*;
use reqwest::Client;
use tokio::task::JoinHandle;
use url::Url;

use crate::content::ContentIndex;
use crate::links::resolve;
use super::config::FetchConfigRef;
use super::state::{FetchState, FetchStateRef};
use super::scrape::fetch_with_retries;

/// Loads the content of every address with a pool of `thread_count` workers.
/// Pages that can't be fetched are left out of the returned index.
pub async fn load_pages(addresses: Vec<Url>, fetch_cfg_ref: FetchConfigRef) -> Result<ContentIndex> {
    let state: FetchStateRef = Arc::new(FetchState::new(addresses));
    let mut handles: Vec<JoinHandle<()>> = Vec::new();

    for worker_id in 0..fetch_cfg_ref.thread_count.max(1) {
        let state = Arc::clone(&state);
        let config = Arc::clone(&fetch_cfg_ref);

        let handle = tokio::spawn(async move {
            let client = Client::new();
            debug!("Worker {} started", worker_id);

            loop {
                let next_address = {
                    let mut queue = state.address_queue.write().await;
                    queue.pop_front()
                };
                let Some(url) = next_address else {
                    break;
                };

                match fetch_with_retries(url.clone(), &client, &config).await {
                    Ok(html) => {
                        // same normalization the link extractor applies, so links and keys agree
                        let address = resolve(url.as_str(), None).unwrap_or_else(|| url.to_string());
                        state.content.write().await.insert(address, html);
                        state.pages_loaded_count.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        warn!("Worker {}: Skipping {}: {}", worker_id, url, e);
                    }
                }
            }

            debug!("Worker {} finished", worker_id);
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.await?;
    }

    info!("Loaded {} pages", state.pages_loaded_count.load(Ordering::Relaxed));
    Ok(state.content_snapshot().await)
}
