use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default timeout for a single request in seconds
pub const REQUEST_TIMEOUT_SEC: u64 = 30;
/// Default capacity of the task queue
pub const QUEUE_CAPACITY: usize = 1000;
/// Client identity sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str = concat!("site-mirror/", env!("CARGO_PKG_VERSION"));

/// Configuration for the crawler, read-only once the crawl starts
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub seed_url: Url,
    pub max_depth: usize,
    pub worker_count: usize,
    pub output_dir: PathBuf,
    pub same_domain_only: bool,
    pub request_timeout_sec: u64,
    pub user_agent: String,
    pub queue_capacity: usize,
}

impl CrawlerConfig {
    pub fn new(seed_url: Url) -> Self {
        Self {
            seed_url,
            max_depth: 1,
            worker_count: 5,
            output_dir: PathBuf::from("./mirror"),
            same_domain_only: true,
            request_timeout_sec: REQUEST_TIMEOUT_SEC,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            queue_capacity: QUEUE_CAPACITY,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_foreign_hosts(mut self, allow: bool) -> Self {
        self.same_domain_only = !allow;
        self
    }

    pub fn with_request_timeout(mut self, timeout_sec: u64) -> Self {
        self.request_timeout_sec = timeout_sec;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }

    /// Hostname every followed link must share when `same_domain_only` is set.
    pub fn seed_host(&self) -> Option<&str> {
        self.seed_url.host_str()
    }
}

pub type CrawlerConfigRef = Arc<CrawlerConfig>;
