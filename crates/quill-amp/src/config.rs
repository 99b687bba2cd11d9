//! Sanitizer configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a
//! valid configuration. A file only needs the keys it overrides:
//!
//! ```json
//! {
//!   "site_url": "https://example.com",
//!   "asset_root": "/var/www/html",
//!   "image_fallback": { "width": 1200, "height": 800 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{
    DEFAULT_IFRAME_SANDBOX, IFRAME_FALLBACK_SIZE, IMAGE_FALLBACK_SIZE, VIDEO_FALLBACK_SIZE,
};

/// Errors raised while loading a [`SanitizerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values parsed but make no sense together.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Default width/height for an element whose size cannot be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackSize {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl FallbackSize {
    /// Create a fallback size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Immutable settings shared by every sanitize call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizerConfig {
    /// Public base URL of the site. Image URLs under it are probed on disk.
    pub site_url: Option<String>,
    /// Directory that `site_url` paths map onto. Without it, only `data:`
    /// images can be measured.
    pub asset_root: Option<PathBuf>,
    /// Canonical URL of the page being finished by `sanitize_page`.
    pub canonical_url: Option<String>,
    /// `sandbox` value given to iframes that have none.
    pub iframe_sandbox: String,
    /// Size used for `amp-img` when probing fails.
    pub image_fallback: FallbackSize,
    /// Size used for `amp-iframe` when dimensions are missing or relative.
    pub iframe_fallback: FallbackSize,
    /// Size used for `amp-video` when dimensions are missing.
    pub video_fallback: FallbackSize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            asset_root: None,
            canonical_url: None,
            iframe_sandbox: DEFAULT_IFRAME_SANDBOX.to_string(),
            image_fallback: IMAGE_FALLBACK_SIZE,
            iframe_fallback: IFRAME_FALLBACK_SIZE,
            video_fallback: VIDEO_FALLBACK_SIZE,
        }
    }
}

impl SanitizerConfig {
    /// Parse and validate a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown keys, and
    /// [`ConfigError::Invalid`] if [`SanitizerConfig::validate`] fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, does not parse,
    /// or fails [`SanitizerConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded sanitizer config");
        Ok(config)
    }

    /// Check values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero fallback dimension, an
    /// empty sandbox policy, or a site URL without an `http(s)` scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, size) in [
            ("image_fallback", self.image_fallback),
            ("iframe_fallback", self.iframe_fallback),
            ("video_fallback", self.video_fallback),
        ] {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must have a non-zero width and height"
                )));
            }
        }

        if self.iframe_sandbox.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "iframe_sandbox must list at least one token".to_string(),
            ));
        }

        if let Some(site_url) = &self.site_url {
            let lower = site_url.to_ascii_lowercase();
            if !lower.starts_with("http://") && !lower.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "site_url '{site_url}' must start with http:// or https://"
                )));
            }
        }

        Ok(())
    }

    /// Swap any fallback size with a zero dimension for the built-in
    /// default. A config built in code skips [`SanitizerConfig::validate`],
    /// and AMP rejects `width="0"`.
    pub(crate) fn replace_zero_fallbacks(&mut self) {
        for (name, size, default) in [
            ("image_fallback", &mut self.image_fallback, IMAGE_FALLBACK_SIZE),
            ("iframe_fallback", &mut self.iframe_fallback, IFRAME_FALLBACK_SIZE),
            ("video_fallback", &mut self.video_fallback, VIDEO_FALLBACK_SIZE),
        ] {
            if size.width == 0 || size.height == 0 {
                tracing::warn!(
                    field = name,
                    width = size.width,
                    height = size.height,
                    "zero fallback size replaced by the default"
                );
                *size = default;
            }
        }
    }
}
