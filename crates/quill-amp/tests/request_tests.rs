//! Integration tests for AMP request detection.

use quill_amp::is_amp_request;

#[test]
fn test_query_flag() {
    assert!(is_amp_request("/recipes/lemon-tart/?amp=1"));
    assert!(is_amp_request("https://quill.example/?utm_source=x&amp=1"));
    assert!(!is_amp_request("/recipes/lemon-tart/?amp=0"));
    assert!(!is_amp_request("/recipes/lemon-tart/?amp"));
    assert!(!is_amp_request("/recipes/lemon-tart/?camp=1"));
}

#[test]
fn test_amp_endpoint() {
    assert!(is_amp_request("/recipes/lemon-tart/amp/"));
    assert!(is_amp_request("/recipes/lemon-tart/amp"));
    assert!(is_amp_request("https://quill.example/2024/05/tart/amp/?ref=home"));
}

#[test]
fn test_regular_pages() {
    assert!(!is_amp_request("/"));
    assert!(!is_amp_request(""));
    assert!(!is_amp_request("/recipes/amplified-flavour/"));
    assert!(!is_amp_request("https://amp.quill.example/recipes/"));
    assert!(!is_amp_request("/search/?q=amp"));
}
