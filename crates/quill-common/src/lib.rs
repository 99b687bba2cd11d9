//! Common utilities for the Quill AMP sanitizer.
//!
//! This crate provides shared infrastructure used by the other crates:
//! - **Warning System** - deduplicated diagnostics routed through `tracing`
//! - **URL helpers** - scheme upgrades, `javascript:` detection, local path mapping
//! - **Image probing** - intrinsic sizes of local files and `data:` URLs

pub mod image;
pub mod url;
pub mod warning;
