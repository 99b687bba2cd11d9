//! Per-call sanitization counters.

use serde::Serialize;

/// What a sanitize call changed.
///
/// Counters only; the report never holds markup. A second pass over already
/// sanitized output reports all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Elements renamed through the rewrite-rule table.
    pub tags_converted: usize,
    /// Disallowed attributes removed.
    pub attributes_stripped: usize,
    /// `http://` URLs upgraded to `https://`.
    pub urls_upgraded: usize,
    /// Dimensions filled from a fallback size instead of the source.
    pub fallback_sizes_applied: usize,
    /// Elements dropped entirely (image without source, non-AMP script, ...).
    pub elements_removed: usize,
    /// YouTube and Google Maps iframes rewritten.
    pub embeds_rewritten: usize,
}

impl Report {
    /// Whether the call changed nothing that is counted.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.tags_converted == 0
            && self.attributes_stripped == 0
            && self.urls_upgraded == 0
            && self.fallback_sizes_applied == 0
            && self.elements_removed == 0
            && self.embeds_rewritten == 0
    }
}
