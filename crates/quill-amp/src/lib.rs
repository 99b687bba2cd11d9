//! HTML-to-AMP sanitizer for the Quill recipe site.
//!
//! # Scope
//!
//! This crate implements:
//! - **Rewrite rules** ([`rules`]): `img`/`iframe`/`video`/`audio` to their
//!   AMP custom elements, the disallowed-attribute policy, AMP constants
//! - **Engine** ([`Sanitizer`]): one pre-order pass over a parsed tree
//! - **Tag handlers** ([`TagHandler`]): `amp-img`, `amp-iframe`,
//!   `amp-video`, `form` and `a` defaults
//! - **Embeds**: YouTube to `amp-youtube`, Google Maps to a sandboxed
//!   `amp-iframe`
//! - **Page finishing**: `<html amp>`, required `<meta>` tags, runtime and
//!   extension scripts, boilerplate
//! - **Request detection** ([`is_amp_request`])
//!
//! Sanitizing never fails. Output is a fixed point: sanitizing it again
//! changes nothing.
//!
//! # Example
//!
//! ```
//! use quill_amp::Sanitizer;
//!
//! let sanitizer = Sanitizer::default();
//! let html = sanitizer.sanitize_fragment(r#"<img src="x.png" onclick="go()">"#);
//! assert_eq!(
//!     html,
//!     r#"<amp-img src="x.png" layout="responsive" width="800" height="600"></amp-img>"#
//! );
//! ```

/// Sanitizer configuration and loading.
pub mod config;
mod embeds;
mod engine;
mod handlers;
mod page;
/// Per-call counters.
pub mod report;
/// AMP request detection.
pub mod request;
/// Rewrite-rule table, attribute policy and AMP constants.
pub mod rules;

pub use config::{ConfigError, FallbackSize, SanitizerConfig};
pub use embeds::{is_google_maps_url, youtube_video_id};
pub use engine::Sanitizer;
pub use handlers::TagHandler;
pub use report::Report;
pub use request::is_amp_request;

/// Sanitize an HTML fragment with the default configuration.
#[must_use]
pub fn sanitize_fragment(html: &str) -> String {
    Sanitizer::default().sanitize_fragment(html)
}
