use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::legacy_to_next;

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href=(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Rewrite every `href` in `html` from the legacy scheme to the nested one.
///
/// Plain text scan, no HTML parse: query strings and fragments are kept as-is,
/// only the path in front of them goes through [`legacy_to_next`].
pub fn rewrite_links(html: &str) -> String {
    HREF_RE
        .replace_all(html, |caps: &Captures| {
            let (url, quote) = match (caps.get(1), caps.get(2)) {
                (Some(m), _) => (m.as_str(), '"'),
                (None, Some(m)) => (m.as_str(), '\''),
                (None, None) => return caps[0].to_string(),
            };
            match rewrite_url(url) {
                Some(new_url) => format!("href={quote}{new_url}{quote}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Internal link targets in `html`, mapped to nested paths, query/fragment
/// dropped, first-seen order, no duplicates.
pub fn internal_links(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for caps in HREF_RE.captures_iter(html) {
        let Some(url) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
            continue;
        };
        if is_external(url) {
            continue;
        }
        let (base, _) = split_suffix(url);
        let path = legacy_to_next(&with_leading_slash(base));
        if seen.insert(path.clone()) {
            links.push(path);
        }
    }
    links
}

fn rewrite_url(url: &str) -> Option<String> {
    if is_external(url) {
        return None;
    }
    let url = with_leading_slash(url);
    let (base, suffix) = split_suffix(&url);
    Some(format!("{}{}", legacy_to_next(base), suffix))
}

fn is_external(url: &str) -> bool {
    url.is_empty()
        || url.starts_with('#')
        || url.contains("://")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
}

fn with_leading_slash(url: &str) -> String {
    if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{}", url)
    }
}

/// Split at the first `?` or `#`.
fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(i) => url.split_at(i),
        None => (url, ""),
    }
}
