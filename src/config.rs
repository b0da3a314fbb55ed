use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::crawler::config::{DEFAULT_USER_AGENT, QUEUE_CAPACITY, REQUEST_TIMEOUT_SEC};
use crate::crawler::{CrawlError, CrawlerConfig};

/// Log levels as defined in log2 crate
#[derive(Debug, Serialize, Deserialize, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// This struct receives all program arguments while CrawlerConfig
/// describes only the crawl itself
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(author, version, about = "Mirror a website to a local directory", long_about = None)]
pub struct Config {
    /// URL to start mirroring from
    #[arg(short, long)]
    pub url: String,
    /// Maximum recursion depth
    #[arg(short, long, default_value = "1")]
    pub depth: usize,
    /// Number of concurrent downloaders
    #[arg(short, long, default_value = "5")]
    pub workers: usize,
    /// Directory the mirror is written to
    #[arg(short, long, default_value = "./mirror")]
    pub output: PathBuf,
    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = REQUEST_TIMEOUT_SEC)]
    pub timeout: u64,
    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
    /// Also follow links to other hosts
    #[arg(long)]
    pub allow_foreign_hosts: bool,
    /// Capacity of the download queue
    #[arg(long, default_value_t = QUEUE_CAPACITY)]
    pub queue_capacity: usize,
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", value_enum)]
    pub log_level: LogLevel,
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == 0 {
            anyhow::bail!("workers must be greater than 0");
        }
        if self.timeout == 0 {
            anyhow::bail!("timeout must be greater than 0");
        }
        if self.queue_capacity == 0 {
            anyhow::bail!("queue_capacity must be greater than 0");
        }
        Ok(())
    }

    /// Resolves the flags into the configuration the crawler runs with.
    pub fn to_crawler_config(&self) -> Result<CrawlerConfig, CrawlError> {
        let seed_url = parse_seed(&self.url)?;
        Ok(CrawlerConfig::new(seed_url)
            .with_max_depth(self.depth)
            .with_worker_count(self.workers)
            .with_output_dir(&self.output)
            .with_foreign_hosts(self.allow_foreign_hosts)
            .with_request_timeout(self.timeout)
            .with_user_agent(&self.user_agent)
            .with_queue_capacity(self.queue_capacity))
    }
}

/// The seed must be an absolute http(s) URL with a host.
pub fn parse_seed(raw: &str) -> Result<Url, CrawlError> {
    let invalid = |reason: String| CrawlError::InvalidSeed {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Creates the mirror root before any worker starts.
pub fn prepare_output_dir(config: &CrawlerConfig) -> Result<(), CrawlError> {
    std::fs::create_dir_all(&config.output_dir).map_err(|source| CrawlError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })
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
