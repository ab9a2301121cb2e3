use std::sync::Arc;

/// Default timeout for page requests in seconds
pub const PAGE_REQUEST_TIMEOUT_SEC: u64 = 2;

/// Configuration for loading page content
pub struct FetchConfig {
    pub thread_count: usize,
    pub request_timeout_sec: u64,
    /// Extra attempts after the first failed request
    pub max_retries: usize,
}

impl FetchConfig {
    pub fn new() -> Self {
        Self {
            thread_count: 4,
            request_timeout_sec: PAGE_REQUEST_TIMEOUT_SEC,
            max_retries: 1,
        }
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_request_timeout(mut self, timeout_sec: u64) -> Self {
        self.request_timeout_sec = timeout_sec;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub type FetchConfigRef = Arc<FetchConfig>;
