//! Integration tests for third-party embed rewriting.

use quill_amp::{Sanitizer, sanitize_fragment};

/// Helper to sanitize a fragment twice and check the second pass is a no-op
fn sanitize_stable(html: &str) -> String {
    let once = sanitize_fragment(html);
    assert_eq!(sanitize_fragment(&once), once, "second pass changed the output");
    once
}

#[test]
fn test_youtube_iframe_becomes_amp_youtube() {
    let html = "<iframe id=\"v\" class=\"video\" width=\"560\" height=\"315\" \
                src=\"https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0\" frameborder=\"0\" allowfullscreen>\
                </iframe>";
    let (output, report) = Sanitizer::default().sanitize_fragment_with_report(html);

    assert_eq!(
        output,
        "<amp-youtube data-videoid=\"dQw4w9WgXcQ\" width=\"480\" height=\"270\" layout=\"responsive\" \
         id=\"v\" class=\"video\"></amp-youtube>"
    );
    assert_eq!(report.embeds_rewritten, 1);
    assert_eq!(report.tags_converted, 0);
    assert_eq!(sanitize_fragment(&output), output);
}

#[test]
fn test_youtube_nocookie_and_title() {
    assert_eq!(
        sanitize_stable("<iframe title=\"How to\" src=\"http://www.youtube-nocookie.com/embed/abc_DEF-1\"></iframe>"),
        "<amp-youtube data-videoid=\"abc_DEF-1\" width=\"480\" height=\"270\" layout=\"responsive\" title=\"How to\"></amp-youtube>"
    );
}

#[test]
fn test_youtube_watch_link_is_a_plain_iframe() {
    let output = sanitize_stable("<iframe src=\"https://www.youtube.com/watch?v=abc\"></iframe>");
    assert!(output.starts_with("<amp-iframe src=\"https://www.youtube.com/watch?v=abc\""));
}

#[test]
fn test_google_map_becomes_sandboxed_amp_iframe() {
    let html = "<iframe src=\"https://www.google.com/maps/embed?pb=abc\" width=\"600\" height=\"450\" \
                style=\"border:0\" allowfullscreen></iframe>";
    let (output, report) = Sanitizer::default().sanitize_fragment_with_report(html);

    assert_eq!(
        output,
        "<amp-iframe src=\"https://www.google.com/maps/embed?pb=abc\" width=\"600\" height=\"450\" allowfullscreen \
         sandbox=\"allow-scripts allow-same-origin allow-popups\" layout=\"responsive\" frameborder=\"0\">\
         <div placeholder>Loading map\u{2026}</div></amp-iframe>"
    );
    assert_eq!(report.embeds_rewritten, 1);
    assert_eq!(sanitize_fragment(&output), output);
}

#[test]
fn test_google_map_keeps_existing_placeholder() {
    let html = "<amp-iframe src=\"https://maps.google.com/?q=bakery\" sandbox=\"allow-scripts allow-same-origin allow-popups\" \
                width=\"800\" height=\"600\" layout=\"responsive\" frameborder=\"0\">\
                <amp-img placeholder src=\"map.png\" width=\"4\" height=\"3\" layout=\"fill\"></amp-img></amp-iframe>";
    assert_eq!(sanitize_stable(html), html);
}

#[test]
fn test_google_map_inside_paragraph_stays_inside() {
    let output = sanitize_stable("<p>Find us: <iframe src=\"https://www.google.com/maps/embed?pb=1\"></iframe></p>");
    assert!(output.starts_with("<p>Find us: <amp-iframe "));
    assert!(output.ends_with("<div placeholder>Loading map\u{2026}</div></amp-iframe></p>"));
}

#[test]
fn test_string_and_tree_entry_points_agree() {
    let html = "<div><iframe src=\"https://www.youtube.com/embed/xyz\"></iframe>\
                <a href=\"/my recipe\">r</a></div>";
    let sanitizer = Sanitizer::default();

    let mut tree = quill_html::parse(html);
    let _ = sanitizer.sanitize(&mut tree);

    assert_eq!(quill_html::serialize(&tree), sanitizer.sanitize_fragment(html));
}
