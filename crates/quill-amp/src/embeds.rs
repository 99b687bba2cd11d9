//! Embed rules for third-party iframes.
//!
//! Runs before the rewrite table so a YouTube iframe becomes `amp-youtube`
//! rather than a generic `amp-iframe`.

use quill_dom::{ElementData, NodeId};

use crate::engine::Pass;
use crate::rules::{DEFAULT_LAYOUT, MAP_PLACEHOLDER_TEXT, MAPS_SANDBOX, YOUTUBE_SIZE};

/// URL fragments that precede a YouTube video id.
const YOUTUBE_EMBED_PREFIXES: &[&str] = &["youtube.com/embed/", "youtube-nocookie.com/embed/"];

/// URL fragments that identify a Google Maps embed.
const GOOGLE_MAPS_MARKERS: &[&str] = &["google.com/maps", "maps.google."];

/// Attributes of a YouTube iframe carried over to `amp-youtube`.
const YOUTUBE_KEPT_ATTRIBUTES: &[&str] = &["id", "class", "title"];

/// Extract the video id from a YouTube embed URL.
///
/// The id runs from the end of the `/embed/` prefix up to the first
/// character outside `[A-Za-z0-9_-]`.
#[must_use]
pub fn youtube_video_id(src: &str) -> Option<&str> {
    let lower = src.to_ascii_lowercase();
    let start = YOUTUBE_EMBED_PREFIXES
        .iter()
        .find_map(|prefix| lower.find(prefix).map(|at| at + prefix.len()))?;
    let rest = &src[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

/// Whether `src` points at an embedded Google map.
#[must_use]
pub fn is_google_maps_url(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    GOOGLE_MAPS_MARKERS.iter().any(|marker| lower.contains(marker))
}

impl Pass<'_> {
    /// Returns the node now standing where `id` was.
    pub(crate) fn apply_embed_rules(&mut self, id: NodeId) -> NodeId {
        let Some(element) = self.element(id) else {
            return id;
        };
        if !matches!(element.tag_name.as_str(), "iframe" | "amp-iframe") {
            return id;
        }
        let src = element.attr("src").unwrap_or_default().to_string();

        if element.tag_name == "iframe"
            && let Some(video_id) = youtube_video_id(&src)
        {
            return self.rewrite_youtube(id, video_id);
        }

        if is_google_maps_url(&src) {
            return self.rewrite_google_map(id);
        }

        id
    }

    /// [amp-youtube](https://amp.dev/documentation/components/amp-youtube)
    fn rewrite_youtube(&mut self, id: NodeId, video_id: &str) -> NodeId {
        let width = YOUTUBE_SIZE.width.to_string();
        let height = YOUTUBE_SIZE.height.to_string();
        let mut data = ElementData::with_attrs(
            "amp-youtube",
            [
                ("data-videoid", video_id),
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("layout", DEFAULT_LAYOUT),
            ],
        );
        if let Some(old) = self.element(id) {
            for name in YOUTUBE_KEPT_ATTRIBUTES {
                if let Some(value) = old.attr(name) {
                    let _ = data.attrs.set(name, value);
                }
            }
        }

        tracing::debug!(video_id, "rewriting YouTube embed");
        let replacement = self.tree.alloc_element(data);
        self.tree.replace_node(id, replacement);
        self.report.embeds_rewritten += 1;
        replacement
    }

    /// Maps become a sandboxed `amp-iframe` with a loading placeholder.
    fn rewrite_google_map(&mut self, id: NodeId) -> NodeId {
        let mut changed = false;

        let id = if self.tree.tag_name(id) == Some("iframe") {
            changed = true;
            self.rename_element(id, "amp-iframe")
        } else {
            id
        };

        if let Some(element) = self.element_mut(id)
            && element.attr("sandbox") != Some(MAPS_SANDBOX)
        {
            let _ = element.attrs.set("sandbox", MAPS_SANDBOX);
            changed = true;
        }

        let has_placeholder = self
            .tree
            .children(id)
            .iter()
            .any(|&child| self.element(child).is_some_and(|e| e.attrs.contains("placeholder")));
        if !has_placeholder {
            let placeholder = self
                .tree
                .alloc_element(ElementData::with_attrs("div", [("placeholder", "")]));
            let text = self.tree.alloc_text(MAP_PLACEHOLDER_TEXT);
            self.tree.append_child(placeholder, text);
            self.tree.append_child(id, placeholder);
            changed = true;
        }

        if changed {
            tracing::debug!("rewriting Google Maps embed");
            self.report.embeds_rewritten += 1;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_youtube_ids() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_video_id("//www.youtube-nocookie.com/embed/a_b-C"),
            Some("a_b-C")
        );
        assert_eq!(youtube_video_id("https://www.youtube.com/watch?v=x"), None);
        assert_eq!(youtube_video_id("https://www.youtube.com/embed/"), None);
    }

    #[test]
    fn detects_google_maps() {
        assert!(is_google_maps_url("https://www.google.com/maps/embed?pb=1"));
        assert!(is_google_maps_url("https://maps.google.com/maps?q=x"));
        assert!(!is_google_maps_url("https://example.com/maps"));
    }
}
