use url::Url;

/// What a task points at. Only pages are ever expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Page,
    Resource,
}

/// One unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: Url,
    pub depth: usize,
    pub kind: TaskKind,
}

impl DownloadTask {
    pub fn page(url: Url, depth: usize) -> Self {
        Self {
            url,
            depth,
            kind: TaskKind::Page,
        }
    }

    pub fn resource(url: Url, depth: usize) -> Self {
        Self {
            url,
            depth,
            kind: TaskKind::Resource,
        }
    }
}
