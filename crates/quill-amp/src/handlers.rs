//! Tag-specific handlers.
//!
//! Each handler fills in what AMP requires of one element type. Handlers only
//! ever add what is missing, so running one twice changes nothing.

use quill_common::url::{escape_url, upgrade_insecure_scheme};
use quill_dom::{ElementData, NodeId};
use strum_macros::Display;

use crate::engine::Pass;
use crate::rules::{DEFAULT_LAYOUT, SUBMIT_ERROR_MESSAGE, SUBMIT_SUCCESS_MESSAGE, has_token};

/// The handler run for an element after renaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TagHandler {
    /// `amp-img`
    Image,
    /// `amp-iframe`
    Iframe,
    /// `amp-video`
    Video,
    /// `form`
    Form,
    /// `a`
    Link,
    /// Everything else: attribute stripping and URL upgrades only.
    Default,
}

impl TagHandler {
    /// Select the handler for a (lowercase) tag name.
    #[must_use]
    pub fn for_tag(tag: &str) -> Self {
        match tag {
            "amp-img" => Self::Image,
            "amp-iframe" => Self::Iframe,
            "amp-video" => Self::Video,
            "form" => Self::Form,
            "a" => Self::Link,
            _ => Self::Default,
        }
    }
}

/// A dimension attribute that holds a relative size, which AMP layout
/// cannot use as an intrinsic size.
fn is_percentage(value: &str) -> bool {
    value.trim().ends_with('%')
}

/// Parse an author-supplied pixel dimension (`"300"`, `"300px"`).
fn parse_dimension(value: &str) -> Option<u32> {
    let value = value.trim();
    let digits = value.strip_suffix("px").unwrap_or(value).trim();
    digits.parse().ok().filter(|&n| n > 0)
}

impl Pass<'_> {
    /// [amp-img](https://amp.dev/documentation/components/amp-img)
    ///
    /// Guarantees a non-empty `src`, `width`, `height` and `layout`, or
    /// removes the element.
    pub(crate) fn handle_image(&mut self, id: NodeId) -> Option<NodeId> {
        if !self.ensure_image_source(id) {
            self.remove_element(id);
            return None;
        }

        let element = self.element_mut(id)?;
        if element.attr_is_blank("layout") {
            let _ = element.attrs.set("layout", DEFAULT_LAYOUT);
        }

        let missing_width = element.attr_is_blank("width");
        let missing_height = element.attr_is_blank("height");
        if !missing_width && !missing_height {
            return Some(id);
        }

        let src = element.attr("src").unwrap_or_default().to_string();
        let width = element.attr("width").and_then(parse_dimension);
        let height = element.attr("height").and_then(parse_dimension);

        let (new_width, new_height) = match self.probe.probe(&src) {
            Ok(size) => {
                tracing::debug!(src = %src, width = size.width, height = size.height, "probed image size");
                match (width, height) {
                    (Some(w), _) => (w, size.height_for_width(w).max(1)),
                    (_, Some(h)) => (size.width_for_height(h).max(1), h),
                    _ => (size.width, size.height),
                }
            }
            Err(e) => {
                tracing::debug!(src = %src, error = %e, "image probe failed; using fallback size");
                self.report.fallback_sizes_applied += 1;
                let fallback = self.config.image_fallback;
                (fallback.width, fallback.height)
            }
        };

        let element = self.element_mut(id)?;
        if missing_width {
            let _ = element.attrs.set("width", &new_width.to_string());
        }
        if missing_height {
            let _ = element.attrs.set("height", &new_height.to_string());
        }
        Some(id)
    }

    /// Make sure `src` is non-empty, borrowing a lazy-load `data-src` if
    /// needed. Returns false when there is nothing to borrow.
    fn ensure_image_source(&mut self, id: NodeId) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        if !element.attr_is_blank("src") {
            return true;
        }
        if element.attr_is_blank("data-src") {
            return false;
        }

        let lazy = element.attr("data-src").unwrap_or_default().trim().to_string();
        let src = match upgrade_insecure_scheme(&lazy) {
            Some(upgraded) => {
                self.report.urls_upgraded += 1;
                upgraded
            }
            None => lazy,
        };
        if let Some(element) = self.element_mut(id) {
            let _ = element.attrs.set("src", &src);
        }
        true
    }

    /// [amp-iframe](https://amp.dev/documentation/components/amp-iframe)
    ///
    /// "Only iframes with a fixed size or responsive layout are allowed" so
    /// missing and percentage dimensions both become the fallback size.
    pub(crate) fn handle_iframe(&mut self, id: NodeId) {
        let fallback = self.config.iframe_fallback;
        let sandbox = self.config.iframe_sandbox.clone();
        let Some(element) = self.element_mut(id) else {
            return;
        };

        let mut fell_back = false;
        for (name, value) in [("width", fallback.width), ("height", fallback.height)] {
            let invalid = element.attr(name).is_none_or(|v| v.trim().is_empty() || is_percentage(v));
            if invalid {
                let _ = element.attrs.set(name, &value.to_string());
                fell_back = true;
            }
        }
        if element.attr_is_blank("layout") {
            let _ = element.attrs.set("layout", DEFAULT_LAYOUT);
        }
        let _ = element.attrs.set_if_missing("sandbox", &sandbox);
        let _ = element.attrs.set_if_missing("frameborder", "0");

        if fell_back {
            self.report.fallback_sizes_applied += 1;
        }
    }

    /// [amp-video](https://amp.dev/documentation/components/amp-video)
    pub(crate) fn handle_video(&mut self, id: NodeId) {
        let fallback = self.config.video_fallback;
        let Some(element) = self.element_mut(id) else {
            return;
        };

        let mut fell_back = false;
        for (name, value) in [("width", fallback.width), ("height", fallback.height)] {
            if element.attr_is_blank(name) {
                let _ = element.attrs.set(name, &value.to_string());
                fell_back = true;
            }
        }
        if element.attr_is_blank("layout") {
            let _ = element.attrs.set("layout", DEFAULT_LAYOUT);
        }

        if fell_back {
            self.report.fallback_sizes_applied += 1;
        }
    }

    /// [amp-form](https://amp.dev/documentation/components/amp-form)
    ///
    /// "The `action` attribute is invalid for POST" and "`action-xhr` ... is
    /// required for POST", so submission goes through `action-xhr`.
    pub(crate) fn handle_form(&mut self, id: NodeId) {
        if let Some(element) = self.element_mut(id) {
            if !element.attrs.contains("action-xhr")
                && let Some(action) = element.attrs.remove("action")
            {
                let _ = element.attrs.set("action-xhr", &action);
            }
            let _ = element.attrs.set_if_missing("target", "_top");
        }

        self.ensure_single_response_template(id, "submit-success", SUBMIT_SUCCESS_MESSAGE);
        self.ensure_single_response_template(id, "submit-error", SUBMIT_ERROR_MESSAGE);
    }

    /// Keep exactly one direct child flagged with `marker`: append a default
    /// `<div marker><template type="amp-mustache">message</template></div>`
    /// when there is none, remove every one after the first otherwise.
    fn ensure_single_response_template(&mut self, form: NodeId, marker: &str, message: &str) {
        let flagged: Vec<NodeId> = self
            .tree
            .children(form)
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some_and(|e| e.attrs.contains(marker)))
            .collect();

        if let Some((_, surplus)) = flagged.split_first() {
            for &duplicate in surplus {
                self.remove_element(duplicate);
            }
            return;
        }

        let container = self.tree.alloc_element(ElementData::with_attrs("div", [(marker, "")]));
        let template = self
            .tree
            .alloc_element(ElementData::with_attrs("template", [("type", "amp-mustache")]));
        let text = self.tree.alloc_text(message);
        self.tree.append_child(template, text);
        self.tree.append_child(container, template);
        self.tree.append_child(form, container);
        tracing::debug!(marker, "added default form response template");
    }

    /// Links: `target` defaults to `_blank`, new-window links get
    /// `rel="noopener noreferrer"`, and hrefs with literal spaces are repaired.
    pub(crate) fn handle_link(&mut self, id: NodeId) {
        let Some(element) = self.element_mut(id) else {
            return;
        };

        let _ = element.attrs.set_if_missing("target", "_blank");

        let opens_new_window = element
            .attr("target")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("_blank"));
        if opens_new_window {
            let rel = element.attr("rel").unwrap_or_default().trim().to_string();
            let missing: Vec<&str> = ["noopener", "noreferrer"]
                .into_iter()
                .filter(|token| !has_token(&rel, token))
                .collect();
            if !missing.is_empty() {
                let merged = std::iter::once(rel.as_str())
                    .filter(|r| !r.is_empty())
                    .chain(missing)
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = element.attrs.set("rel", &merged);
            }
        }

        if let Some(href) = element.attr("href")
            && href.contains(' ')
        {
            let escaped = escape_url(href);
            tracing::debug!(href, escaped = %escaped, "repairing link URL");
            let _ = element.attrs.set("href", &escaped);
        }
    }
}
