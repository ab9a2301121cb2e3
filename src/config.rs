use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::convergence::DEFAULT_EPSILON;
use crate::fetch::{FetchConfig, PAGE_REQUEST_TIMEOUT_SEC};
use crate::hits::HitsConfig;
use crate::links::LinkPolicy;

/// Log levels as defined in log2 crate
#[derive(Debug, Serialize, Deserialize, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Which links of a page become graph edges
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkPolicyArg {
    All,
    SameHost,
    Wikipedia,
}

/// This struct receives all program arguments, while HitsConfig and FetchConfig
/// describe only the engine and the page loader
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Keyword query selecting the base set
    #[arg(short, long)]
    pub query: String,
    /// Page to load over HTTP (repeatable)
    #[arg(short, long = "address")]
    pub addresses: Vec<String>,
    /// JSON object mapping page address to raw content, used instead of fetching
    #[arg(short, long)]
    pub content_file: Option<PathBuf>,
    /// Which links found on a page are kept
    #[arg(long, default_value = "all", value_enum)]
    pub link_policy: LinkPolicyArg,
    /// Largest per-score change still treated as converged
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    pub epsilon: f64,
    /// Stop after this many iterations even without convergence
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Iterations to run before convergence is honoured
    #[arg(long, default_value = "1")]
    pub min_iterations: usize,
    /// Number of one-hop expansions of the base set
    #[arg(long, default_value = "1")]
    pub expansion_passes: usize,
    /// Number of concurrent page loads
    #[arg(long, default_value = "4")]
    pub thread_count: usize,
    /// Request timeout in seconds
    #[arg(long, default_value_t = PAGE_REQUEST_TIMEOUT_SEC)]
    pub request_timeout: u64,
    /// Extra attempts for a failed request
    #[arg(long, default_value = "1")]
    pub max_retries: usize,
    /// Print only the best N pages
    #[arg(short, long)]
    pub top: Option<usize>,
    /// Output file for the ranking as JSON
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", value_enum)]
    pub log_level: LogLevel,
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.addresses.is_empty() && self.content_file.is_none() {
            anyhow::bail!("either --address or --content-file must be given");
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            anyhow::bail!("epsilon must be a non-negative number");
        }
        if self.epsilon == 0.0 && self.max_iterations.is_none() {
            anyhow::bail!("epsilon 0 needs --max-iterations, scores may never stop changing exactly");
        }
        if self.thread_count == 0 {
            anyhow::bail!("thread_count must be greater than 0");
        }
        if self.expansion_passes == 0 {
            anyhow::bail!("expansion_passes must be greater than 0");
        }
        if self.min_iterations == 0 {
            anyhow::bail!("min_iterations must be greater than 0");
        }
        if let Some(max) = self.max_iterations {
            if max < self.min_iterations {
                anyhow::bail!("max_iterations must not be lower than min_iterations");
            }
        }
        Ok(())
    }

    pub fn hits_config(&self) -> HitsConfig {
        HitsConfig::default()
            .with_epsilon(self.epsilon)
            .with_max_iterations(self.max_iterations)
            .with_min_iterations(self.min_iterations)
            .with_expansion_passes(self.expansion_passes)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::new()
            .with_thread_count(self.thread_count)
            .with_request_timeout(self.request_timeout)
            .with_max_retries(self.max_retries)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}

impl From<LinkPolicyArg> for LinkPolicy {
    fn from(arg: LinkPolicyArg) -> Self {
        match arg {
            LinkPolicyArg::All => LinkPolicy::All,
            LinkPolicyArg::SameHost => LinkPolicy::SameHost,
            LinkPolicyArg::Wikipedia => LinkPolicy::Wikipedia,
        }
    }
}
