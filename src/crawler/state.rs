use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::error::CrawlError;
use super::mirror::local_path;
use super::task::TaskKind;

/// Why a task ended without being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyVisited,
    DepthExceeded,
    /// Referenced as a resource, but also linked as a page still to be crawled
    WantedAsPage,
}

/// Terminal state of one task
#[derive(Debug)]
pub enum TaskOutcome {
    Saved(TaskKind),
    Skipped(SkipReason),
    Failed(CrawlError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFailure {
    pub url: String,
    pub message: String,
}

/// Shared state of a running crawl
pub struct CrawlerState {
    /// Every URL ever claimed for download, keyed by the file it is mirrored to
    pub visited_urls: RwLock<HashMap<String, Url>>,
    /// Files some page linked to with an anchor
    page_requests: RwLock<HashSet<String>>,
    pub pages_saved: AtomicUsize,
    pub resources_saved: AtomicUsize,
    pub skipped: AtomicUsize,
    pub failures: Mutex<Vec<CrawlFailure>>,
}

impl CrawlerState {
    pub fn new() -> Self {
        Self {
            visited_urls: RwLock::new(HashMap::new()),
            page_requests: RwLock::new(HashSet::new()),
            pages_saved: AtomicUsize::new(0),
            resources_saved: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Marks `url` as visited. Returns `true` only for the single caller
    /// that inserted it; check and mark happen under one write lock.
    ///
    /// URLs mirrored to the same file (`http` and `https`, or another port on
    /// the same host) share one claim.
    pub async fn claim(&self, url: &Url) -> bool {
        match self.visited_urls.write().await.entry(local_path(url)) {
            Entry::Vacant(slot) => {
                slot.insert(url.clone());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub async fn is_visited(&self, url: &Url) -> bool {
        self.visited_urls.read().await.contains_key(&local_path(url))
    }

    /// Remembers that a page links to `url` with an anchor, so a resource
    /// task for it can step aside.
    pub async fn request_page(&self, url: &Url) {
        self.page_requests.write().await.insert(local_path(url));
    }

    pub async fn is_page_requested(&self, url: &Url) -> bool {
        self.page_requests.read().await.contains(&local_path(url))
    }

    pub async fn record(&self, url: &Url, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Saved(TaskKind::Page) => {
                self.pages_saved.fetch_add(1, Ordering::Relaxed);
            }
            TaskOutcome::Saved(TaskKind::Resource) => {
                self.resources_saved.fetch_add(1, Ordering::Relaxed);
            }
            TaskOutcome::Skipped(_) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            TaskOutcome::Failed(e) => {
                self.failures.lock().await.push(CrawlFailure {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    pub async fn summary(&self, elapsed: Duration) -> CrawlSummary {
        CrawlSummary {
            pages_saved: self.pages_saved.load(Ordering::Relaxed),
            resources_saved: self.resources_saved.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failures: self.failures.lock().await.clone(),
            elapsed,
        }
    }
}

impl Default for CrawlerState {
    fn default() -> Self {
        Self::new()
    }
}

pub type CrawlerStateRef = Arc<CrawlerState>;

/// End-of-run report
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub pages_saved: usize,
    pub resources_saved: usize,
    pub skipped: usize,
    pub failures: Vec<CrawlFailure>,
    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn files_saved(&self) -> usize {
        self.pages_saved + self.resources_saved
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failed(&self, url: &str) -> bool {
        self.failures.iter().any(|f| f.url == url)
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages and {} resources saved, {} skipped, {} failed in {:.2?}",
            self.pages_saved,
            self.resources_saved,
            self.skipped,
            self.failed(),
            self.elapsed
        )
    }
}
