//! Permissive link extraction over raw page bytes.
//!
//! This is a linear scan, not a markup parser: find `<tag`, take everything
//! up to the next `>` as the tag, look for `attr="..."` or `attr='...'`
//! inside it. Anything that does not fit that shape is simply not a match.

use std::collections::HashSet;
use std::ops::Range;

/// Anchor links that may lead to further pages.
pub const PAGE_ATTRIBUTES: [(&str, &str); 1] = [("a", "href")];

/// Embedded resources a page needs to render.
pub const RESOURCE_ATTRIBUTES: [(&str, &str); 6] = [
    ("link", "href"),
    ("script", "src"),
    ("img", "src"),
    ("iframe", "src"),
    ("embed", "src"),
    ("source", "src"),
];

/// Raw link values found on a page, split by what they point at.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub pages: Vec<String>,
    pub resources: Vec<String>,
}

/// Byte range of one attribute value inside the scanned content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpan {
    pub value: Range<usize>,
}

/// Every value of `attribute` on `tag` elements, in document order, without
/// exact duplicates.
pub fn find_all(content: &[u8], tag: &str, attribute: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    attribute_spans(content, tag, attribute)
        .into_iter()
        .map(|span| String::from_utf8_lossy(&content[span.value]).into_owned())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

pub fn extract_page_links(content: &[u8]) -> PageLinks {
    PageLinks {
        pages: collect_unique(content, &PAGE_ATTRIBUTES),
        resources: collect_unique(content, &RESOURCE_ATTRIBUTES),
    }
}

fn collect_unique(content: &[u8], pairs: &[(&str, &str)]) -> Vec<String> {
    let mut seen = HashSet::new();
    pairs
        .iter()
        .flat_map(|(tag, attribute)| find_all(content, tag, attribute))
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Locations of every `attribute` value on `tag` elements.
pub fn attribute_spans(content: &[u8], tag: &str, attribute: &str) -> Vec<AttributeSpan> {
    let open = format!("<{}", tag.to_ascii_lowercase()).into_bytes();
    let attribute = attribute.to_ascii_lowercase().into_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_ignore_case(content, &open, pos) {
        let name_end = start + open.len();
        match content.get(name_end) {
            Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {}
            // `<a` is also the start of `<abbr>`
            Some(_) => {
                pos = name_end;
                continue;
            }
            None => break,
        }

        let Some(len) = content[name_end..].iter().position(|&b| b == b'>') else {
            break;
        };
        let tag_end = name_end + len;
        if let Some(value) = find_value(content, name_end..tag_end, &attribute) {
            spans.push(AttributeSpan { value });
        }
        pos = tag_end + 1;
    }

    spans
}

fn find_value(content: &[u8], tag: Range<usize>, attribute: &[u8]) -> Option<Range<usize>> {
    let body = &content[tag.clone()];
    let mut search = 0;

    while let Some(idx) = find_ignore_case(body, attribute, search) {
        search = idx + 1;
        let before = content[tag.start + idx - 1];
        if !(before.is_ascii_whitespace() || before == b'/') {
            continue;
        }

        let mut i = skip_whitespace(body, idx + attribute.len());
        if body.get(i) != Some(&b'=') {
            continue;
        }
        i = skip_whitespace(body, i + 1);
        let quote = match body.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => return None,
        };

        let value_start = i + 1;
        let len = body[value_start..].iter().position(|&b| b == quote)?;
        return Some(tag.start + value_start..tag.start + value_start + len);
    }

    None
}

fn skip_whitespace(body: &[u8], mut i: usize) -> usize {
    while body.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
        i += 1;
    }
    i
}

fn find_ignore_case(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|idx| from + idx)
}
