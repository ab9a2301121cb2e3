use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::RwLock;
use url::Url;

use crate::content::ContentIndex;

/// Shared state of the page loader workers
pub struct FetchState {
    /// Number of pages loaded successfully
    pub pages_loaded_count: AtomicUsize,
    /// Addresses still waiting to be fetched
    pub address_queue: RwLock<VecDeque<Url>>,
    /// Raw content of every page loaded so far
    pub content: RwLock<ContentIndex>,
}

impl FetchState {
    pub fn new(addresses: impl IntoIterator<Item = Url>) -> Self {
        Self {
            pages_loaded_count: AtomicUsize::new(0),
            address_queue: RwLock::new(addresses.into_iter().collect()),
            content: RwLock::new(ContentIndex::new()),
        }
    }

    /// Copy of the content loaded so far
    pub async fn content_snapshot(&self) -> ContentIndex {
        self.content.read().await.clone()
    }
}

pub type FetchStateRef = Arc<FetchState>;
