//! The AMP rewrite-rule table and attribute policy.
//!
//! [AMP HTML Specification](https://amp.dev/documentation/guides-and-tutorials/learn/spec/amphtml)
//!
//! Everything in this module is a constant or a pure lookup. The engine and
//! the tag handlers read from it; nothing here touches a tree.

use quill_common::url::is_javascript_url;

use crate::config::FallbackSize;

/// A source tag and the AMP custom element that replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteRule {
    /// Tag name found in the input.
    pub source: &'static str,
    /// AMP element written in its place.
    pub target: &'static str,
}

/// [AMP § HTML Tags](https://amp.dev/documentation/guides-and-tutorials/learn/spec/amphtml#html-tags)
///
/// "`img`: Replaced with `amp-img`."
/// "`video`: Replaced with `amp-video`."
/// "`audio`: Replaced with `amp-audio`."
/// "`iframe`: May appear as a descendant of `amp-iframe`" only, so top-level
/// iframes become `amp-iframe` too.
pub const REWRITE_RULES: &[RewriteRule] = &[
    RewriteRule {
        source: "img",
        target: "amp-img",
    },
    RewriteRule {
        source: "iframe",
        target: "amp-iframe",
    },
    RewriteRule {
        source: "video",
        target: "amp-video",
    },
    RewriteRule {
        source: "audio",
        target: "amp-audio",
    },
];

/// The AMP element `tag` should become, if any.
///
/// Tags that already start with `amp-` never match.
#[must_use]
pub fn rewrite_target(tag: &str) -> Option<&'static str> {
    if tag.starts_with("amp-") {
        return None;
    }
    REWRITE_RULES
        .iter()
        .find(|rule| rule.source == tag)
        .map(|rule| rule.target)
}

/// Event handler attributes that are always stripped.
///
/// Any other `on<name>` attribute is stripped as well; the list exists so the
/// common ones read clearly in logs and tests.
pub const EVENT_HANDLER_ATTRIBUTES: &[&str] = &[
    "onclick", "onload", "onunload", "onchange", "onsubmit", "onreset",
];

/// Attributes that AMP forbids on every element regardless of value.
pub const FORBIDDEN_ATTRIBUTES: &[&str] = &["style"];

/// [AMP § Attributes](https://amp.dev/documentation/guides-and-tutorials/learn/spec/amphtml#attributes)
///
/// "Attribute names starting with `on` (such as `onclick` or `onmouseover`)
/// are disallowed in AMP HTML. The attribute with the literal name `on`
/// (no suffix) is allowed."
///
/// "URLs with the `javascript:` scheme are disallowed."
#[must_use]
pub fn is_disallowed_attribute(name: &str, value: &str) -> bool {
    FORBIDDEN_ATTRIBUTES.contains(&name)
        || EVENT_HANDLER_ATTRIBUTES.contains(&name)
        || (name.len() > 2 && name.starts_with("on"))
        || is_javascript_url(value)
}

/// Whether `token` appears in the space-separated `list` (`rel`, `class`),
/// ASCII case-insensitively.
#[must_use]
pub fn has_token(list: &str, token: &str) -> bool {
    list.split_ascii_whitespace()
        .any(|t| t.eq_ignore_ascii_case(token))
}

/// Attributes whose `http://` values are upgraded to `https://`.
pub const URL_ATTRIBUTES: &[&str] = &["src", "href", "action"];

/// `layout` given to sized AMP elements that have none.
pub const DEFAULT_LAYOUT: &str = "responsive";

/// `sandbox` policy for iframes, broad enough for maps and video widgets.
pub const DEFAULT_IFRAME_SANDBOX: &str = "allow-scripts allow-same-origin allow-popups allow-forms";

/// `sandbox` policy for Google Maps embeds.
pub const MAPS_SANDBOX: &str = "allow-scripts allow-same-origin allow-popups";

/// Fallback for `amp-img` when probing fails.
pub const IMAGE_FALLBACK_SIZE: FallbackSize = FallbackSize::new(800, 600);

/// Fallback for `amp-iframe` when sizes are missing or relative.
pub const IFRAME_FALLBACK_SIZE: FallbackSize = FallbackSize::new(800, 600);

/// Fallback for `amp-video` when sizes are missing.
pub const VIDEO_FALLBACK_SIZE: FallbackSize = FallbackSize::new(800, 600);

/// Fixed size of `amp-youtube` embeds.
pub const YOUTUBE_SIZE: FallbackSize = FallbackSize::new(480, 270);

/// Body of the default `submit-success` template.
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Form submitted successfully!";

/// Body of the default `submit-error` template.
pub const SUBMIT_ERROR_MESSAGE: &str = "Error submitting form.";

/// Text shown while a map embed loads.
pub const MAP_PLACEHOLDER_TEXT: &str = "Loading map\u{2026}";

/// Base URL of the AMP runtime and its extensions.
pub const AMP_CDN: &str = "https://cdn.ampproject.org/";

/// The AMP runtime script.
pub const AMP_RUNTIME_SRC: &str = "https://cdn.ampproject.org/v0.js";

/// AMP components that need a `custom-element` script when used.
///
/// `amp-img` is built into the runtime and is deliberately absent.
pub const AMP_EXTENSIONS: &[&str] = &[
    "amp-ad",
    "amp-analytics",
    "amp-audio",
    "amp-carousel",
    "amp-form",
    "amp-iframe",
    "amp-image-lightbox",
    "amp-sidebar",
    "amp-video",
    "amp-youtube",
];

/// `src` of the `custom-element` script for `extension`.
#[must_use]
pub fn extension_script_src(extension: &str) -> String {
    format!("{AMP_CDN}v0/{extension}-0.1.js")
}

/// [AMP boilerplate](https://amp.dev/documentation/guides-and-tutorials/learn/spec/amp-boilerplate)
pub const BOILERPLATE_CSS: &str = "body{-webkit-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-moz-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-ms-animation:-amp-start 8s steps(1,end) 0s 1 normal both;animation:-amp-start 8s steps(1,end) 0s 1 normal both}@-webkit-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-moz-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-ms-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-o-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}";

/// Boilerplate override used inside `<noscript>`.
pub const BOILERPLATE_NOSCRIPT_CSS: &str =
    "body{-webkit-animation:none;-moz-animation:none;-ms-animation:none;animation:none}";

/// `content` of the viewport meta tag.
pub const VIEWPORT_CONTENT: &str = "width=device-width,minimum-scale=1,initial-scale=1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_table_lookup() {
        assert_eq!(rewrite_target("img"), Some("amp-img"));
        assert_eq!(rewrite_target("audio"), Some("amp-audio"));
        assert_eq!(rewrite_target("amp-img"), None);
        assert_eq!(rewrite_target("div"), None);
    }

    #[test]
    fn rewrite_sources_are_unique() {
        for (i, rule) in REWRITE_RULES.iter().enumerate() {
            assert!(
                REWRITE_RULES[i + 1..]
                    .iter()
                    .all(|other| other.source != rule.source)
            );
        }
    }

    #[test]
    fn disallowed_attribute_policy() {
        assert!(is_disallowed_attribute("style", "color:red"));
        assert!(is_disallowed_attribute("onclick", "go()"));
        assert!(is_disallowed_attribute("onmouseover", "go()"));
        assert!(is_disallowed_attribute("href", " javascript:alert(1)"));
        assert!(!is_disallowed_attribute("on", "tap:menu.toggle"));
        assert!(!is_disallowed_attribute("class", "once"));
        assert!(!is_disallowed_attribute("href", "/javascript-tips"));
    }

    #[test]
    fn token_lists_are_case_insensitive() {
        assert!(has_token("nofollow NoOpener", "noopener"));
        assert!(!has_token("noopenerx", "noopener"));
        assert!(!has_token("", "noopener"));
    }

    #[test]
    fn extension_script_urls() {
        assert_eq!(
            extension_script_src("amp-form"),
            "https://cdn.ampproject.org/v0/amp-form-0.1.js"
        );
    }
}
