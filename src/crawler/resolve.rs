use url::Url;

use super::config::CrawlerConfig;
use super::error::ResolveError;

const PSEUDO_SCHEMES: [&str; 2] = ["javascript:", "mailto:"];

/// Turns a raw link found on `base` into an absolute URL.
///
/// Absolute links are parsed as they are. Anything else (path-relative,
/// root-relative, scheme-relative) is resolved against `base`.
pub fn resolve_link(raw: &str, base: &Url) -> Result<Url, ResolveError> {
    let link = raw.trim();
    if link.is_empty() {
        return Err(ResolveError::Empty);
    }
    if link.starts_with('#') {
        return Err(ResolveError::FragmentOnly);
    }
    for scheme in PSEUDO_SCHEMES {
        if starts_with_ignore_case(link, scheme) {
            return Err(ResolveError::PseudoScheme(scheme.trim_end_matches(':')));
        }
    }

    match Url::parse(link) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(base.join(link)?),
        Err(e) => Err(e.into()),
    }
}

/// The URL a task is queued and fetched with. The fragment never reaches the
/// server, so it is dropped; the query is kept. Claims go further and key on
/// the mirrored file, see `CrawlerState::claim`.
pub fn crawl_key(url: &Url) -> Url {
    let mut key = url.clone();
    key.set_fragment(None);
    key
}

/// Policy gate for following a discovered link.
pub fn should_download(url: &Url, config: &CrawlerConfig) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    if config.same_domain_only {
        return match (url.host_str(), config.seed_host()) {
            (Some(target), Some(seed)) => target == seed,
            _ => false,
        };
    }
    true
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
