//! Integration tests for full-page finishing.

use quill_amp::{Sanitizer, SanitizerConfig};
use quill_dom::NodeId;
use quill_html::parse;

const PAGE: &str = "<!DOCTYPE html><html lang=\"en\"><head>\n\
                    <title>Lemon tart</title>\n\
                    <script src=\"https://example.com/tracker.js\"></script>\n\
                    <script>window.x = 1;</script>\n\
                    <script type=\"application/ld+json\">{\"@type\":\"Recipe\"}</script>\n\
                    <link rel=\"stylesheet\" href=\"/style.css\">\n\
                    </head><body><img src=\"tart.png\">\
                    <iframe src=\"https://www.youtube.com/embed/abc\"></iframe>\
                    <form action=\"/newsletter\"><input name=\"email\"></form></body></html>";

fn sanitizer_with_canonical() -> Sanitizer {
    Sanitizer::new(SanitizerConfig {
        canonical_url: Some("https://quill.example/lemon-tart/".to_string()),
        ..SanitizerConfig::default()
    })
}

/// Helper to list the start tags of `<head>` children, with their key attribute
fn head_summary(html: &str) -> Vec<String> {
    let tree = parse(html);
    let head = tree.head().expect("page has a head");
    tree.children(head)
        .iter()
        .filter_map(|&id| tree.as_element(id))
        .map(|e| {
            let key = ["charset", "name", "rel", "custom-element", "custom-template", "src", "type", "amp-boilerplate"]
                .into_iter()
                .find(|&name| e.attrs.contains(name))
                .map(|name| format!("[{name}]"))
                .unwrap_or_default();
            format!("{}{key}", e.tag_name)
        })
        .collect()
}

#[test]
fn test_page_head_is_completed_in_order() {
    let output = sanitizer_with_canonical().sanitize_page(PAGE);

    assert_eq!(
        head_summary(&output),
        [
            "meta[charset]",
            "meta[name]",
            "title",
            "script[type]",
            "link[rel]",
            "script[src]",
            "script[custom-element]",
            "script[custom-element]",
            "script[custom-template]",
            "style[amp-boilerplate]",
            "noscript",
        ]
    );
}

#[test]
fn test_page_markers_and_required_tags() {
    let output = sanitizer_with_canonical().sanitize_page(PAGE);

    assert!(output.starts_with("<!DOCTYPE html><html lang=\"en\" amp><head><meta charset=\"utf-8\">"));
    assert!(output.contains(
        "<meta name=\"viewport\" content=\"width=device-width,minimum-scale=1,initial-scale=1\">"
    ));
    assert!(output.contains("<link rel=\"canonical\" href=\"https://quill.example/lemon-tart/\">"));
    assert!(output.contains("<script async src=\"https://cdn.ampproject.org/v0.js\"></script>"));
    assert!(output.contains(
        "<script async custom-element=\"amp-form\" src=\"https://cdn.ampproject.org/v0/amp-form-0.1.js\"></script>"
    ));
    assert!(output.contains(
        "<script async custom-element=\"amp-youtube\" src=\"https://cdn.ampproject.org/v0/amp-youtube-0.1.js\"></script>"
    ));
    assert!(output.contains(
        "<script async custom-template=\"amp-mustache\" src=\"https://cdn.ampproject.org/v0/amp-mustache-0.2.js\"></script>"
    ));
    assert!(output.contains("<style amp-boilerplate>body{-webkit-animation:-amp-start 8s steps(1,end) 0s 1 normal both;"));
    assert!(output.contains(
        "<noscript><style amp-boilerplate>body{-webkit-animation:none;-moz-animation:none;-ms-animation:none;animation:none}</style></noscript>"
    ));
}

#[test]
fn test_page_drops_non_amp_resources() {
    let (output, report) = sanitizer_with_canonical().sanitize_page_with_report(PAGE);

    assert!(!output.contains("tracker.js"));
    assert!(!output.contains("window.x"));
    assert!(!output.contains("style.css"));
    assert!(output.contains("<script type=\"application/ld+json\">{\"@type\":\"Recipe\"}</script>"));
    assert_eq!(report.elements_removed, 3);
}

#[test]
fn test_page_finishing_is_idempotent() {
    let sanitizer = sanitizer_with_canonical();
    let once = sanitizer.sanitize_page(PAGE);
    let (twice, report) = sanitizer.sanitize_page_with_report(&once);

    assert_eq!(twice, once);
    assert!(report.is_clean());
}

#[test]
fn test_existing_amp_markers_are_respected() {
    let page = "<html \u{26a1}><head><meta name=\"viewport\" content=\"width=device-width\">\
                <meta charset=\"utf-8\"></head><body></body></html>";
    let output = Sanitizer::default().sanitize_page(page);

    assert!(output.starts_with("<html \u{26a1}><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width\">"));
    assert!(!output.contains(" amp>"));
    assert!(!output.contains("rel=\"canonical\""));
}

#[test]
fn test_only_used_extensions_are_loaded() {
    let output = Sanitizer::default().sanitize_page("<html><head></head><body><p>text</p></body></html>");
    assert!(!output.contains("custom-element"));
    assert!(!output.contains("custom-template"));
    assert!(output.contains("v0.js"));
}

#[test]
fn test_page_without_head_is_best_effort() {
    let sanitizer = Sanitizer::default();
    let html = "<p><img src=\"a.png\"></p><script>alert(1)</script>";

    let output = sanitizer.sanitize_page(html);
    assert_eq!(
        output,
        "<p><amp-img src=\"a.png\" layout=\"responsive\" width=\"800\" height=\"600\"></amp-img></p>"
    );
    let tree = parse(&output);
    assert_eq!(tree.find_element(NodeId::ROOT, "meta"), None);
}

#[test]
fn test_nested_head_in_fragment_is_not_the_page_head() {
    let html = "<section><head></head><p>x</p></section>";
    let output = Sanitizer::default().sanitize_page(html);

    assert_eq!(output, html);
}
