//! Integration tests for `amp-img` sizing from real image data.

use std::fs;
use std::path::Path;

use base64::Engine;
use quill_amp::{FallbackSize, Sanitizer, SanitizerConfig};

/// Helper to write a blank PNG of the given size below `dir`.
fn write_png(dir: &Path, relative: &str, width: u32, height: u32) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture directory");
    }
    image::RgbImage::new(width, height)
        .save(&path)
        .expect("write PNG fixture");
}

/// Helper to build a sanitizer rooted at `dir` for `https://quill.example`
fn site_sanitizer(dir: &Path) -> Sanitizer {
    Sanitizer::new(SanitizerConfig {
        site_url: Some("https://quill.example".to_string()),
        asset_root: Some(dir.to_path_buf()),
        ..SanitizerConfig::default()
    })
}

#[test]
fn test_local_image_is_measured() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "uploads/tart.png", 40, 20);
    let sanitizer = site_sanitizer(dir.path());

    let (output, report) =
        sanitizer.sanitize_fragment_with_report("<img src=\"http://quill.example/uploads/tart.png?v=2\">");

    assert_eq!(
        output,
        "<amp-img src=\"https://quill.example/uploads/tart.png?v=2\" layout=\"responsive\" width=\"40\" height=\"20\"></amp-img>"
    );
    assert_eq!(report.fallback_sizes_applied, 0);
}

#[test]
fn test_missing_dimension_follows_aspect_ratio() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "uploads/tart.png", 40, 20);
    let sanitizer = site_sanitizer(dir.path());

    assert_eq!(
        sanitizer.sanitize_fragment("<img src=\"/uploads/tart.png\" width=\"80\">"),
        "<amp-img src=\"/uploads/tart.png\" width=\"80\" layout=\"responsive\" height=\"40\"></amp-img>"
    );
    assert_eq!(
        sanitizer.sanitize_fragment("<img src=\"uploads/tart.png\" height=\"10px\">"),
        "<amp-img src=\"uploads/tart.png\" height=\"10px\" layout=\"responsive\" width=\"20\"></amp-img>"
    );
}

#[test]
fn test_data_url_is_measured() {
    let mut bytes = Vec::new();
    image::RgbImage::new(3, 2)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode PNG");
    let src = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    );

    let output = Sanitizer::default().sanitize_fragment(&format!("<img src=\"{src}\">"));
    assert!(output.ends_with("layout=\"responsive\" width=\"3\" height=\"2\"></amp-img>"));
}

#[test]
fn test_svg_is_measured() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("logo.svg"),
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="45"></svg>"#,
    )
    .expect("write SVG fixture");

    let output = site_sanitizer(dir.path()).sanitize_fragment("<img src=\"/logo.svg\">");
    assert!(output.ends_with("width=\"120\" height=\"45\"></amp-img>"));
}

#[test]
fn test_unresolvable_images_fall_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sanitizer = site_sanitizer(dir.path());

    for src in [
        "https://cdn.elsewhere.example/a.png",
        "/uploads/missing.png",
        "/uploads/../../etc/passwd",
        "data:image/png;base64,not-base64!",
    ] {
        let (output, report) = sanitizer.sanitize_fragment_with_report(&format!("<img src=\"{src}\">"));
        assert!(
            output.ends_with("width=\"800\" height=\"600\"></amp-img>"),
            "unexpected output for {src}: {output}"
        );
        assert_eq!(report.fallback_sizes_applied, 1);
    }
}

#[test]
fn test_unreadable_file_falls_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("broken.png"), b"not an image").expect("write fixture");

    let output = site_sanitizer(dir.path()).sanitize_fragment("<img src=\"/broken.png\">");
    assert!(output.ends_with("width=\"800\" height=\"600\"></amp-img>"));
}

#[test]
fn test_configured_fallback_size() {
    let sanitizer = Sanitizer::new(SanitizerConfig {
        image_fallback: FallbackSize::new(1200, 800),
        ..SanitizerConfig::default()
    });
    assert_eq!(
        sanitizer.sanitize_fragment("<img src=\"remote.png\" height=\"300\">"),
        "<amp-img src=\"remote.png\" height=\"300\" layout=\"responsive\" width=\"1200\"></amp-img>"
    );
}
