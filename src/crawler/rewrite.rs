use std::ops::Range;
use url::Url;

use super::extract::{PAGE_ATTRIBUTES, RESOURCE_ATTRIBUTES, attribute_spans};
use super::mirror::relative_reference;
use super::resolve::resolve_link;

/// Rewrites every same-host reference in `content` to point at the mirrored
/// copy. Foreign and unresolvable references are left byte for byte.
pub fn rewrite_links(content: &[u8], base: &Url) -> Vec<u8> {
    let mut spans: Vec<Range<usize>> = PAGE_ATTRIBUTES
        .iter()
        .chain(RESOURCE_ATTRIBUTES.iter())
        .flat_map(|(tag, attribute)| attribute_spans(content, tag, attribute))
        .map(|span| span.value)
        .collect();
    spans.sort_by_key(|span| span.start);

    let mut rewritten = Vec::with_capacity(content.len());
    let mut pos = 0;
    for span in spans {
        if span.start < pos {
            continue;
        }
        let raw = String::from_utf8_lossy(&content[span.clone()]);
        let Some(local) = localize(&raw, base) else {
            continue;
        };
        rewritten.extend_from_slice(&content[pos..span.start]);
        rewritten.extend_from_slice(local.as_bytes());
        pos = span.end;
    }
    rewritten.extend_from_slice(&content[pos..]);
    rewritten
}

/// Local replacement for a single raw reference found on `base`. `None`
/// when the reference must stay as it is.
///
/// The result is relative to the directory of the file `base` is mirrored
/// to, not to the `{host}/{path}` string itself, so `a.html` next to
/// `b.html` becomes `b.html` and not `../b.html`. The query is already part
/// of the mirrored file name; the fragment is kept after it.
pub fn localize(raw: &str, base: &Url) -> Option<String> {
    let target = resolve_link(raw, base).ok()?;
    if !matches!(target.scheme(), "http" | "https") || target.host_str() != base.host_str() {
        return None;
    }

    let mut reference = relative_reference(base, &target);
    if let Some(fragment) = target.fragment() {
        reference.push('#');
        reference.push_str(fragment);
    }
    Some(reference)
}
