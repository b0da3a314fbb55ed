use std::path::{Path, PathBuf};
use url::Url;

use super::error::CrawlError;

const INDEX_DOCUMENT: &str = "index.html";

/// One fetched resource as it lands on disk.
#[derive(Debug, Clone)]
pub struct MirrorEntry {
    pub url: Url,
    pub local_path: PathBuf,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl MirrorEntry {
    pub fn is_html(&self) -> bool {
        is_html_content(&self.content_type)
    }
}

pub fn is_html_content(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

/// Maps a URL to its path inside the mirror root: `{host}/{path}`, with
/// directory-style paths ending in `index.html`. A non-empty query is folded
/// into the file name ahead of the extension (`list?p=1` becomes `list_p=1`,
/// `post.html?id=7` becomes `post_id=7.html`). Scheme, port and fragment do
/// not take part.
///
/// This string is also the key of the visited set, so two claimed URLs never
/// write the same file.
pub fn local_path(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let mut path = url.path().trim_start_matches('/').to_string();
    if path.is_empty() || path.ends_with('/') {
        path.push_str(INDEX_DOCUMENT);
    }
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        path = with_query(&path, query);
    }
    format!("{host}/{path}")
}

/// Only characters that survive both the filesystem and an unescaped href
/// are kept from the query, anything else becomes `_`.
fn with_query(path: &str, query: &str) -> String {
    let suffix: String = query
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '=' | '&' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, extension) = path.split_at(name_start + dot);
            format!("{stem}_{suffix}{extension}")
        }
        _ => format!("{path}_{suffix}"),
    }
}

/// Where `url` is stored under `root` on this filesystem.
pub fn file_path(root: &Path, url: &Url) -> PathBuf {
    root.join(local_path(url))
}

/// Reference to `target`'s mirrored file from inside `page`'s mirrored file.
pub fn relative_reference(page: &Url, target: &Url) -> String {
    let from = PathBuf::from(local_path(page));
    let to = PathBuf::from(local_path(target));
    let from_dir = from.parent().unwrap_or(Path::new(""));

    let relative = pathdiff::diff_paths(&to, from_dir).unwrap_or(to);
    // always `/`, whatever the platform separator
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Writes `content` to the file mapped from `url`, creating directories on
/// the way. Returns the full path written.
pub async fn save(root: &Path, url: &Url, content: &[u8]) -> Result<PathBuf, CrawlError> {
    let path = file_path(root, url);
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| CrawlError::Persist {
                path: dir.to_path_buf(),
                source,
            })?;
    }
    overwrite(&path, content).await?;
    Ok(path)
}

pub async fn overwrite(path: &Path, content: &[u8]) -> Result<(), CrawlError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| CrawlError::Persist {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_local_path_mapping() {
        assert_eq!(local_path(&url("http://ex.test/a.html")), "ex.test/a.html");
        assert_eq!(local_path(&url("http://ex.test")), "ex.test/index.html");
        assert_eq!(local_path(&url("http://ex.test/")), "ex.test/index.html");
        assert_eq!(local_path(&url("http://ex.test/docs/")), "ex.test/docs/index.html");
        assert_eq!(
            local_path(&url("https://ex.test:8443/img/x.png?v=3#top")),
            "ex.test/img/x_v=3.png"
        );
        assert_eq!(local_path(&url("http://ex.test/list?p=1")), "ex.test/list_p=1");
        assert_eq!(
            local_path(&url("http://ex.test/docs/?page=2&sort=asc")),
            "ex.test/docs/index_page=2&sort=asc.html"
        );
        // an empty query is no query
        assert_eq!(local_path(&url("http://ex.test/a.html?")), "ex.test/a.html");
    }

    #[test]
    fn test_query_variants_get_their_own_files() {
        let first = local_path(&url("http://ex.test/list?p=1"));
        let second = local_path(&url("http://ex.test/list?p=2"));
        assert_ne!(first, second);
        assert_ne!(first, local_path(&url("http://ex.test/list")));

        // separators and escapes from the query never create directories
        assert_eq!(
            local_path(&url("http://ex.test/v1.2/find?q=a/b%20c")),
            "ex.test/v1.2/find_q=a_b_20c"
        );
    }

    #[test]
    fn test_scheme_and_port_share_a_file() {
        let plain = local_path(&url("http://ex.test/x.css"));
        assert_eq!(plain, local_path(&url("https://ex.test/x.css")));
        assert_eq!(plain, local_path(&url("http://ex.test:8080/x.css")));
    }

    #[test]
    fn test_local_path_is_deterministic() {
        let u = url("http://ex.test/a/b/c.css");
        assert_eq!(local_path(&u), local_path(&u.clone()));
    }

    #[test]
    fn test_relative_reference() {
        let page = url("http://ex.test/a.html");
        assert_eq!(relative_reference(&page, &url("http://ex.test/b.html")), "b.html");
        assert_eq!(
            relative_reference(&page, &url("http://ex.test/img/x.png")),
            "img/x.png"
        );
        assert_eq!(relative_reference(&page, &url("http://ex.test/")), "index.html");
        assert_eq!(
            relative_reference(&page, &url("http://ex.test/img/x.png?v=3")),
            "img/x_v=3.png"
        );

        let nested = url("http://ex.test/docs/guide/");
        assert_eq!(
            relative_reference(&nested, &url("http://ex.test/b.html")),
            "../../b.html"
        );
        assert_eq!(
            relative_reference(&nested, &url("http://ex.test/docs/api.html")),
            "../api.html"
        );
    }

    #[test]
    fn test_is_html_content() {
        assert!(is_html_content("text/html; charset=utf-8"));
        assert!(is_html_content("Application/XHTML+XML"));
        assert!(!is_html_content("text/plain"));
        assert!(!is_html_content(""));
    }

    #[tokio::test]
    async fn test_save_creates_directories() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = save(dir.path(), &url("http://ex.test/deep/er/page.html"), b"hello").await?;
        assert_eq!(path, dir.path().join("ex.test/deep/er/page.html"));
        assert_eq!(std::fs::read(&path)?, b"hello");

        overwrite(&path, b"again").await?;
        assert_eq!(std::fs::read(&path)?, b"again");
        Ok(())
    }

    #[tokio::test]
    async fn test_save_reports_persist_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        // a regular file where the host directory should go
        std::fs::write(dir.path().join("ex.test"), b"in the way")?;
        let result = save(dir.path(), &url("http://ex.test/a.html"), b"x").await;
        assert!(matches!(result, Err(CrawlError::Persist { .. })));
        Ok(())
    }
}
