use std::path::PathBuf;

/// Errors raised while preparing or running a crawl.
///
/// `InvalidSeed` and `OutputDir` are fatal and stop the process before any
/// worker starts. Every other variant is reported per task and the crawl
/// carries on.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("invalid seed URL `{url}`: {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP Error Status Code = {0}")]
    HttpStatus(u16),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("cannot write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CrawlError {
    /// Fatal errors abort the crawl before it starts.
    #[cfg(test)]
    pub(crate) fn is_fatal(&self) -> bool {
        matches!(self, CrawlError::InvalidSeed { .. } | CrawlError::OutputDir { .. })
    }
}

/// Why a raw link could not be turned into an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("empty link")]
    Empty,

    #[error("fragment-only link")]
    FragmentOnly,

    #[error("pseudo-link with `{0}` scheme")]
    PseudoScheme(&'static str),

    #[error(transparent)]
    Malformed(#[from] url::ParseError),
}
