pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod frontier;
pub mod mirror;
pub mod resolve;
pub mod rewrite;
pub mod runner;
pub mod state;
pub mod task;


pub use config::{CrawlerConfig, CrawlerConfigRef, REQUEST_TIMEOUT_SEC};
pub use error::{CrawlError, ResolveError};
pub use extract::{extract_page_links, find_all, PageLinks};
pub use fetch::{FetchedResource, Fetcher};
pub use mirror::{local_path, MirrorEntry};
pub use resolve::{resolve_link, should_download};
pub use rewrite::rewrite_links;
pub use runner::crawl;
pub use state::{CrawlSummary, CrawlerState, CrawlerStateRef};
pub use task::{DownloadTask, TaskKind};
