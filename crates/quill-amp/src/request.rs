//! AMP request detection.
//!
//! A page is served as AMP when the request asks for it either through the
//! query string (`?amp=1`) or through an `/amp/` endpoint in the path
//! (`/recipes/lemon-tart/amp/`).

/// Whether the request URI asks for the AMP rendition of a page.
///
/// Accepts a path with optional query (`/post/amp?x=1`) or a full URL.
/// Fragments are ignored.
#[must_use]
pub fn is_amp_request(uri: &str) -> bool {
    let uri = uri.split_once('#').map_or(uri, |(before, _)| before);
    let (path, query) = uri.split_once('?').unwrap_or((uri, ""));

    let query_flag = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| key == "amp" && value == "1");

    query_flag || path.contains("/amp/") || path.ends_with("/amp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_fragment() {
        assert!(!is_amp_request("/post#amp=1"));
        assert!(is_amp_request("/post?amp=1#top"));
    }
}
