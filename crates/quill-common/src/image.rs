//! Intrinsic image size probing.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
//!
//! AMP needs explicit `width`/`height` on every `amp-img`. When the author
//! left them out, the sanitizer asks an [`ImageProbe`] for the intrinsic
//! size of the referenced file. Probing is a three-step pipeline:
//!
//! 1. **Locate**: `data:` URLs are decoded in memory; everything else is
//!    mapped onto the local asset root with [`resolve_local_path`].
//! 2. **Detect**: [`detect_format`] decides between SVG and raster.
//! 3. **Measure**: raster headers are read with the `image` crate, SVG
//!    documents are parsed with `usvg`.
//!
//! Every failure is a [`ProbeError`]; callers treat it as "use the fallback".

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use thiserror::Error;

use crate::url::resolve_local_path;

/// Intrinsic dimensions of an image, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    /// Intrinsic width.
    pub width: u32,
    /// Intrinsic height.
    pub height: u32,
}

impl ImageSize {
    /// Create a size from a width/height pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height matching `width` at this size's aspect ratio, rounded.
    #[must_use]
    pub fn height_for_width(self, width: u32) -> u32 {
        scale(width, self.height, self.width)
    }

    /// Width matching `height` at this size's aspect ratio, rounded.
    #[must_use]
    pub fn width_for_height(self, height: u32) -> u32 {
        scale(height, self.width, self.height)
    }
}

/// `value * numerator / denominator`, rounded to the nearest integer.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return value;
    }
    let scaled = (u64::from(value) * u64::from(numerator) + u64::from(denominator) / 2)
        / u64::from(denominator);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Why an image could not be measured.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The `src` does not map onto the local asset store.
    #[error("'{0}' does not resolve to a local asset")]
    Unresolvable(String),
    /// The file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// File that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The raster header could not be decoded.
    #[error("could not decode image header: {0}")]
    Decode(#[from] image::ImageError),
    /// The SVG document could not be parsed.
    #[error("could not parse SVG: {0}")]
    Svg(#[from] usvg::Error),
    /// The `data:` URL is malformed.
    #[error("invalid data URL: {0}")]
    DataUrl(String),
    /// The image reports a zero width or height.
    #[error("image has zero-size dimensions")]
    ZeroSize,
}

/// Detected image format.
///
/// The `image` crate sniffs raster sub-formats (PNG/JPEG/GIF/WebP/…) itself,
/// so only the SVG/raster split matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// SVG vector image, measured via `usvg`.
    Svg,
    /// Raster image, measured via the `image` crate.
    Raster,
}

/// Detect whether `bytes` represent an SVG or a raster image.
///
/// 1. **Extension check**: `.svg` in `path_hint`.
/// 2. **MIME check**: `image/svg` media type from a `data:` URL.
/// 3. **Magic-byte sniffing**: leading `<?xml` or `<svg` after whitespace.
/// 4. **Default**: [`ImageFormat::Raster`].
#[must_use]
pub fn detect_format(path_hint: &str, mime: Option<&str>, bytes: &[u8]) -> ImageFormat {
    if Path::new(path_hint)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    {
        return ImageFormat::Svg;
    }

    if mime.is_some_and(|m| m.to_ascii_lowercase().starts_with("image/svg")) {
        return ImageFormat::Svg;
    }

    let trimmed: Vec<u8> = bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(256)
        .copied()
        .collect();
    if trimmed.starts_with(b"<?xml") || trimmed.starts_with(b"<svg") {
        return ImageFormat::Svg;
    }

    ImageFormat::Raster
}

/// A decoded `data:` URL.
///
/// [RFC 2397](https://www.rfc-editor.org/rfc/rfc2397)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type, e.g. `image/png`. Empty when the URL omitted it.
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Decode a `data:` URL. Base64 and percent-encoded payloads are supported.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::DataUrl`] if the URL has no `data:` prefix, no
    /// comma separator, or an undecodable payload.
    pub fn parse(url: &str) -> Result<Self, ProbeError> {
        let body = url
            .get(..5)
            .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
            .map(|_| &url[5..])
            .ok_or_else(|| ProbeError::DataUrl("missing data: prefix".to_string()))?;
        let (metadata, data) = body
            .split_once(',')
            .ok_or_else(|| ProbeError::DataUrl("missing comma".to_string()))?;

        let (mime, is_base64) = match metadata.strip_suffix(";base64") {
            Some(mime) => (mime, true),
            None => (metadata, false),
        };
        let mime = mime.split(';').next().unwrap_or_default().trim().to_string();

        let bytes = if is_base64 {
            let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| ProbeError::DataUrl(format!("base64 decode error: {e}")))?
        } else {
            urlencoding::decode_binary(data.as_bytes()).into_owned()
        };

        Ok(Self { mime, bytes })
    }
}

/// Measures images referenced from markup.
#[derive(Debug, Clone, Default)]
pub struct ImageProbe {
    site_url: Option<String>,
    asset_root: Option<PathBuf>,
}

impl ImageProbe {
    /// Create a probe that resolves URLs under `site_url` to files below
    /// `asset_root`. Without an asset root only `data:` URLs can be measured.
    #[must_use]
    pub const fn new(site_url: Option<String>, asset_root: Option<PathBuf>) -> Self {
        Self {
            site_url,
            asset_root,
        }
    }

    /// Determine the intrinsic size of the image at `src`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] if the image cannot be located, read, or
    /// decoded, or if it reports a zero dimension.
    pub fn probe(&self, src: &str) -> Result<ImageSize, ProbeError> {
        let src = src.trim();
        if src
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
        {
            let data_url = DataUrl::parse(src)?;
            let format = detect_format("", Some(&data_url.mime), &data_url.bytes);
            return measure(format, &data_url.bytes);
        }

        let path = self
            .asset_root
            .as_deref()
            .and_then(|root| resolve_local_path(src, self.site_url.as_deref(), root))
            .ok_or_else(|| ProbeError::Unresolvable(src.to_string()))?;

        probe_file(&path)
    }
}

/// Measure an image file on disk.
///
/// Raster files are measured from their header only; SVG files are read in
/// full because the size lives in the root element's attributes.
///
/// # Errors
///
/// Returns a [`ProbeError`] if the file cannot be read or decoded.
pub fn probe_file(path: &Path) -> Result<ImageSize, ProbeError> {
    let io_error = |source: std::io::Error| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let hint = path.to_string_lossy();
    if detect_format(&hint, None, &[]) == ImageFormat::Svg {
        let bytes = fs::read(path).map_err(io_error)?;
        return measure(ImageFormat::Svg, &bytes);
    }

    let (width, height) = image::ImageReader::open(path)
        .map_err(io_error)?
        .with_guessed_format()
        .map_err(io_error)?
        .into_dimensions()?;
    non_zero(width, height)
}

/// Measure an in-memory image of the given format.
fn measure(format: ImageFormat, bytes: &[u8]) -> Result<ImageSize, ProbeError> {
    match format {
        ImageFormat::Svg => {
            let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())?;
            let size = tree.size();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (width, height) = (size.width().round() as u32, size.height().round() as u32);
            non_zero(width, height)
        }
        ImageFormat::Raster => {
            let (width, height) = image::ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()
                .map_err(|e| ProbeError::Decode(image::ImageError::IoError(e)))?
                .into_dimensions()?;
            non_zero(width, height)
        }
    }
}

fn non_zero(width: u32, height: u32) -> Result<ImageSize, ProbeError> {
    if width == 0 || height == 0 {
        Err(ProbeError::ZeroSize)
    } else {
        Ok(ImageSize::new(width, height))
    }
}
