//! Integration tests for intrinsic image size probing.

use std::fs;
use std::path::Path;

use base64::Engine;
use quill_common::image::{DataUrl, ImageFormat, ImageProbe, ImageSize, ProbeError, detect_format};

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

/// Helper to encode a blank PNG as a base64 `data:` URL.
fn png_data_url(width: u32, height: u32) -> String {
    let mut bytes = Vec::new();
    image::RgbImage::new(width, height)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode PNG");
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[test]
fn test_probe_site_url_maps_to_asset_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "uploads/2024/tart.png", 40, 30);

    let probe = ImageProbe::new(
        Some("https://quill.example".to_string()),
        Some(dir.path().to_path_buf()),
    );

    let size = probe
        .probe("http://quill.example/uploads/2024/tart.png?ver=3")
        .expect("probe succeeds");
    assert_eq!(size, ImageSize::new(40, 30));

    let size = probe.probe("/uploads/2024/tart.png").expect("probe succeeds");
    assert_eq!(size, ImageSize::new(40, 30));
}

#[test]
fn test_probe_svg_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("logo.svg"),
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="45"></svg>"#,
    )
    .expect("write SVG fixture");

    let probe = ImageProbe::new(None, Some(dir.path().to_path_buf()));
    assert_eq!(probe.probe("logo.svg").expect("probe succeeds"), ImageSize::new(120, 45));
}

#[test]
fn test_probe_data_url() {
    let probe = ImageProbe::default();
    let size = probe.probe(&png_data_url(7, 9)).expect("probe succeeds");
    assert_eq!(size, ImageSize::new(7, 9));
}

#[test]
fn test_probe_remote_url_is_unresolvable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let probe = ImageProbe::new(
        Some("https://quill.example".to_string()),
        Some(dir.path().to_path_buf()),
    );
    let err = probe.probe("https://cdn.elsewhere.example/a.png").unwrap_err();
    assert!(matches!(err, ProbeError::Unresolvable(_)));
}

#[test]
fn test_probe_without_asset_root_is_unresolvable() {
    let err = ImageProbe::default().probe("/uploads/a.png").unwrap_err();
    assert!(matches!(err, ProbeError::Unresolvable(_)));
}

#[test]
fn test_probe_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let probe = ImageProbe::new(None, Some(dir.path().to_path_buf()));
    let err = probe.probe("/nope.png").unwrap_err();
    assert!(matches!(err, ProbeError::Io { .. }));
}

#[test]
fn test_probe_garbage_file_is_decode_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("broken.png"), b"definitely not an image").expect("write fixture");
    let probe = ImageProbe::new(None, Some(dir.path().to_path_buf()));
    assert!(probe.probe("broken.png").is_err());
}

#[test]
fn test_data_url_percent_encoded_payload() {
    let data_url = DataUrl::parse("data:text/plain,hello%20world").expect("valid data URL");
    assert_eq!(data_url.mime, "text/plain");
    assert_eq!(data_url.bytes, b"hello world");
}

#[test]
fn test_data_url_without_comma_is_rejected() {
    assert!(matches!(
        DataUrl::parse("data:image/png;base64"),
        Err(ProbeError::DataUrl(_))
    ));
}

#[test]
fn test_detect_format() {
    assert_eq!(detect_format("a/b/logo.SVG", None, b""), ImageFormat::Svg);
    assert_eq!(detect_format("", Some("image/svg+xml"), b""), ImageFormat::Svg);
    assert_eq!(detect_format("", None, b"  \n<svg width='1'/>"), ImageFormat::Svg);
    assert_eq!(detect_format("photo.jpg", None, b"\xFF\xD8\xFF"), ImageFormat::Raster);
}

#[test]
fn test_aspect_ratio_helpers() {
    let size = ImageSize::new(1600, 900);
    assert_eq!(size.height_for_width(800), 450);
    assert_eq!(size.width_for_height(90), 160);
    assert_eq!(ImageSize::new(3, 0).width_for_height(10), 10);
}
