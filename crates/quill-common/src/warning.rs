//! Deduplicated diagnostics routed through `tracing`.
//!
//! Sanitizing a long page can hit the same parse problem hundreds of times
//! (an unclosed `<p>` in every paragraph of an old post). A [`Warnings`] set
//! lives exactly as long as the tokenizer or tree builder that owns it, so
//! each distinct message is emitted once per document and nothing carries
//! over to the next one.

use std::collections::HashSet;

/// Messages already emitted for one document.
#[derive(Debug, Clone)]
pub struct Warnings {
    component: &'static str,
    seen: HashSet<String>,
}

impl Warnings {
    /// Create an empty set whose events are tagged with `component`.
    #[must_use]
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            seen: HashSet::new(),
        }
    }

    /// Emit `message` at warn level unless this set already emitted it.
    ///
    /// # Example
    /// ```
    /// use quill_common::warning::Warnings;
    ///
    /// let mut warnings = Warnings::new("HTML Parser");
    /// warnings.warn_once("stray end tag </div> ignored");
    /// warnings.warn_once("stray end tag </div> ignored");
    /// assert_eq!(warnings.len(), 1);
    /// ```
    pub fn warn_once(&mut self, message: &str) {
        if self.seen.contains(message) {
            return;
        }
        let _ = self.seen.insert(message.to_string());
        tracing::warn!(component = self.component, "{message}");
    }

    /// Number of distinct messages emitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_sets_do_not_share_messages() {
        let mut first = Warnings::new("HTML Parser");
        first.warn_once("stray end tag </tag1> ignored");
        first.warn_once("stray end tag </tag1> ignored");
        first.warn_once("stray end tag </tag2> ignored");
        assert_eq!(first.len(), 2);

        let mut second = Warnings::new("HTML Parser");
        assert!(second.is_empty());
        second.warn_once("stray end tag </tag1> ignored");
        assert_eq!(second.len(), 1);
    }
}
