pub mod state;
pub mod config;
pub mod scrape;
pub mod runner;


pub use state::{FetchState, FetchStateRef};
pub use config::{FetchConfig, FetchConfigRef, PAGE_REQUEST_TIMEOUT_SEC};
pub use scrape::{fetch_page, fetch_with_retries};
pub use runner::load_pages;
