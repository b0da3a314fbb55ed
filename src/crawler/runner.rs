use anyhow::Result;
use log2::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use super::config::CrawlerConfigRef;
use super::extract::extract_page_links;
use super::fetch::Fetcher;
use super::frontier::Frontier;
use super::mirror::{self, MirrorEntry};
use super::resolve::{crawl_key, resolve_link, should_download};
use super::rewrite::rewrite_links;
use super::state::{CrawlSummary, CrawlerStateRef, SkipReason, TaskOutcome};
use super::task::{DownloadTask, TaskKind};

/// Everything a worker needs, shared by all of them
struct WorkerContext {
    state: CrawlerStateRef,
    config: CrawlerConfigRef,
    frontier: Frontier,
    fetcher: Fetcher,
}

/// Mirrors the site starting at the configured seed and returns once every
/// reachable task has reached a terminal state.
pub async fn crawl(crawler_state_ref: CrawlerStateRef, crawler_cfg_ref: CrawlerConfigRef) -> Result<CrawlSummary> {
    let started = Instant::now();
    let context = Arc::new(WorkerContext {
        fetcher: Fetcher::new(&crawler_cfg_ref)?,
        frontier: Frontier::new(crawler_cfg_ref.queue_capacity),
        state: crawler_state_ref,
        config: crawler_cfg_ref,
    });

    let seed = crawl_key(&context.config.seed_url);
    info!("Mirroring {} (depth: {}) into {}", seed, context.config.max_depth, context.config.output_dir.display());
    context.frontier.submit(vec![DownloadTask::page(seed, 0)]);

    let mut handles: Vec<JoinHandle<()>> = Vec::new();
    for worker_id in 0..context.config.worker_count.max(1) {
        let context = Arc::clone(&context);
        handles.push(tokio::spawn(run_worker(worker_id, context)));
    }

    for handle in handles {
        handle.await?;
    }

    Ok(context.state.summary(started.elapsed()).await)
}

async fn run_worker(worker_id: usize, context: Arc<WorkerContext>) {
    let mut done = context.frontier.subscribe();
    info!("Worker {} started", worker_id);

    while let Some(task) = context.frontier.next(&mut done).await {
        let url = task.url.clone();
        let outcome = process_task(worker_id, task, &context).await;
        match &outcome {
            TaskOutcome::Failed(e) => warn!("Worker {}: Failed {}: {}", worker_id, url, e),
            TaskOutcome::Skipped(reason) => debug!("Worker {}: Skipped {} ({:?})", worker_id, url, reason),
            TaskOutcome::Saved(_) => {}
        }
        context.state.record(&url, outcome).await;
        context.frontier.complete();
    }

    info!("Worker {} finished", worker_id);
}

/// Claim, fetch, save, and for HTML pages expand and localize links.
async fn process_task(worker_id: usize, task: DownloadTask, context: &WorkerContext) -> TaskOutcome {
    let config = &context.config;
    if task.depth > config.max_depth {
        return TaskOutcome::Skipped(SkipReason::DepthExceeded);
    }
    // an anchor to the same file outranks an iframe or embed: the page task is queued too
    if task.kind == TaskKind::Resource && context.state.is_page_requested(&task.url).await {
        return TaskOutcome::Skipped(SkipReason::WantedAsPage);
    }
    if !context.state.claim(&task.url).await {
        return TaskOutcome::Skipped(SkipReason::AlreadyVisited);
    }

    info!("Worker {}: Downloading {} at depth {}", worker_id, task.url, task.depth);
    let fetched = match context.fetcher.fetch(&task.url).await {
        Ok(fetched) => fetched,
        Err(e) => return TaskOutcome::Failed(e),
    };
    let local_path = match mirror::save(&config.output_dir, &task.url, &fetched.content).await {
        Ok(path) => path,
        Err(e) => return TaskOutcome::Failed(e),
    };
    let entry = MirrorEntry {
        url: task.url,
        local_path,
        content: fetched.content,
        content_type: fetched.content_type,
    };

    match task.kind {
        TaskKind::Page if entry.is_html() => {
            if task.depth < config.max_depth {
                let discovered = discover(&entry, task.depth, context).await;
                debug!("Worker {}: Queueing {} new links from {}", worker_id, discovered.len(), entry.url);
                context.frontier.submit(discovered);
            }
            let localized = rewrite_links(&entry.content, &entry.url);
            if let Err(e) = mirror::overwrite(&entry.local_path, &localized).await {
                return TaskOutcome::Failed(e);
            }
        }
        TaskKind::Page => debug!("Worker {}: {} is {:?}, not expanding", worker_id, entry.url, entry.content_type),
        TaskKind::Resource => {}
    }

    info!("Worker {}: Saved {} to {}", worker_id, entry.url, entry.local_path.display());
    TaskOutcome::Saved(task.kind)
}

/// New tasks for the links on `entry`: anchors one level deeper, resources
/// at the page's own depth. A link found both ways on one page is a page.
async fn discover(entry: &MirrorEntry, depth: usize, context: &WorkerContext) -> Vec<DownloadTask> {
    let links = extract_page_links(&entry.content);
    let candidates = links
        .pages
        .iter()
        .map(|link| (link, TaskKind::Page))
        .chain(links.resources.iter().map(|link| (link, TaskKind::Resource)));

    let mut seen = HashSet::new();
    let mut tasks = Vec::new();
    for (raw, kind) in candidates {
        let url = match resolve_link(raw, &entry.url) {
            Ok(url) => crawl_key(&url),
            Err(e) => {
                debug!("Dropping link {:?} on {}: {}", raw, entry.url, e);
                continue;
            }
        };
        if !should_download(&url, &context.config) {
            debug!("Not following {}", url);
            continue;
        }
        // claim() is what guarantees a single fetch; this only keeps the queue short
        if !seen.insert(url.clone()) || context.state.is_visited(&url).await {
            continue;
        }
        tasks.push(match kind {
            TaskKind::Page => {
                context.state.request_page(&url).await;
                DownloadTask::page(url, depth + 1)
            }
            TaskKind::Resource => DownloadTask::resource(url, depth),
        });
    }
    tasks
}
