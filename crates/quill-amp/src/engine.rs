//! Tree traversal and rewrite engine.
//!
//! A [`Sanitizer`] owns nothing but configuration. Each call builds a
//! [`Pass`] that borrows the tree mutably, walks it pre-order and records
//! what it changed in a [`Report`].
//!
//! Per element, in order:
//!
//! 1. Embed rules (YouTube, Google Maps) look at iframes first.
//! 2. Rewrite-rule renaming (`img` → `amp-img`, ...).
//! 3. Disallowed attribute stripping.
//! 4. `http://` → `https://` on `src`, `href`, `action`.
//! 5. The tag handler chosen from the final tag name.
//!
//! Children are visited after their parent has been fully processed, so
//! anything a handler appends (form templates, map placeholders) is visited
//! as well.

use quill_common::image::ImageProbe;
use quill_common::url::upgrade_insecure_scheme;
use quill_dom::{DomTree, ElementData, NodeId, NodeType};
use quill_html::{parse, serialize, serialize_node};

use crate::config::SanitizerConfig;
use crate::handlers::TagHandler;
use crate::report::Report;
use crate::rules::{URL_ATTRIBUTES, is_disallowed_attribute, rewrite_target};

/// Converts HTML into AMP HTML.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads and reused for any number of documents.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    config: SanitizerConfig,
    probe: ImageProbe,
}

impl Sanitizer {
    /// Create a sanitizer with the given configuration.
    ///
    /// A fallback size with a zero dimension is replaced by the default so
    /// every sized element still gets usable dimensions.
    #[must_use]
    pub fn new(mut config: SanitizerConfig) -> Self {
        config.replace_zero_fallbacks();
        let probe = ImageProbe::new(config.site_url.clone(), config.asset_root.clone());
        Self { config, probe }
    }

    /// The configuration this sanitizer was built with.
    #[must_use]
    pub const fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Sanitize every element of `tree` in place.
    pub fn sanitize(&self, tree: &mut DomTree) -> Report {
        let mut pass = Pass::new(self, tree);
        pass.run();
        pass.report
    }

    /// Sanitize an HTML fragment (post body, widget text).
    #[must_use]
    pub fn sanitize_fragment(&self, html: &str) -> String {
        self.sanitize_fragment_with_report(html).0
    }

    /// Like [`Sanitizer::sanitize_fragment`], also returning the [`Report`].
    #[must_use]
    pub fn sanitize_fragment_with_report(&self, html: &str) -> (String, Report) {
        let mut tree = parse(html);
        let report = self.sanitize(&mut tree);
        (serialize(&tree), report)
    }

    /// Sanitize a complete page and add the document-level AMP requirements
    /// (runtime script, boilerplate, required `<meta>` tags).
    #[must_use]
    pub fn sanitize_page(&self, html: &str) -> String {
        self.sanitize_page_with_report(html).0
    }

    /// Like [`Sanitizer::sanitize_page`], also returning the [`Report`].
    #[must_use]
    pub fn sanitize_page_with_report(&self, html: &str) -> (String, Report) {
        let mut tree = parse(html);
        let mut pass = Pass::new(self, &mut tree);
        pass.run();
        pass.finish_page();
        let report = pass.report;
        (serialize(&tree), report)
    }

    /// Sanitize `html` and return only its first `amp-img`, serialized.
    ///
    /// Returns `html` unchanged when it contains no image that survives
    /// sanitizing.
    #[must_use]
    pub fn convert_image(&self, html: &str) -> String {
        let mut tree = parse(html);
        let _ = self.sanitize(&mut tree);
        tree.find_element(NodeId::ROOT, "amp-img")
            .map_or_else(|| html.to_string(), |img| serialize_node(&tree, img))
    }
}

/// State of one sanitize call.
pub(crate) struct Pass<'a> {
    pub(crate) config: &'a SanitizerConfig,
    pub(crate) probe: &'a ImageProbe,
    pub(crate) tree: &'a mut DomTree,
    pub(crate) report: Report,
}

impl<'a> Pass<'a> {
    fn new(sanitizer: &'a Sanitizer, tree: &'a mut DomTree) -> Self {
        Self {
            config: &sanitizer.config,
            probe: &sanitizer.probe,
            tree,
            report: Report::default(),
        }
    }

    /// Walk the tree pre-order, processing every element exactly once.
    fn run(&mut self) {
        let mut stack: Vec<NodeId> = self.tree.children(NodeId::ROOT).iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let is_element = self
                .tree
                .get(id)
                .is_some_and(|node| matches!(node.node_type, NodeType::Element(_)));
            if !is_element {
                continue;
            }

            if let Some(current) = self.process_element(id) {
                stack.extend(self.tree.children(current).iter().rev().copied());
            }
        }

        tracing::debug!(report = ?self.report, "sanitize pass complete");
    }

    /// Apply every per-element step. Returns the node now standing in the
    /// element's place, or `None` if it was removed.
    fn process_element(&mut self, id: NodeId) -> Option<NodeId> {
        // STEP 1: Embeds.
        let mut id = self.apply_embed_rules(id);

        // STEP 2: Rewrite rules.
        if let Some(target) = self.tree.tag_name(id).and_then(rewrite_target) {
            id = self.rename_element(id, target);
            self.report.tags_converted += 1;
        }

        // STEP 3: Disallowed attributes.
        self.strip_disallowed_attributes(id);

        // STEP 4: Insecure URLs.
        self.upgrade_urls(id);

        // STEP 5: Tag handler.
        let handler = TagHandler::for_tag(self.tree.tag_name(id)?);
        self.dispatch(handler, id)
    }

    fn dispatch(&mut self, handler: TagHandler, id: NodeId) -> Option<NodeId> {
        match handler {
            TagHandler::Image => return self.handle_image(id),
            TagHandler::Iframe => self.handle_iframe(id),
            TagHandler::Video => self.handle_video(id),
            TagHandler::Form => self.handle_form(id),
            TagHandler::Link => self.handle_link(id),
            TagHandler::Default => {}
        }
        Some(id)
    }

    /// Replace `id` with a new `target` element carrying the same attributes
    /// (in order) and the same children.
    pub(crate) fn rename_element(&mut self, id: NodeId, target: &str) -> NodeId {
        let Some(old) = self.tree.as_element(id) else {
            return id;
        };
        tracing::debug!(from = %old.tag_name, to = target, "rewriting element");

        let data = ElementData {
            tag_name: target.to_string(),
            attrs: old.attrs.clone(),
        };
        let replacement = self.tree.alloc_element(data);
        self.tree.move_children(id, replacement);
        self.tree.replace_node(id, replacement);
        replacement
    }

    /// Detach `id` from the tree and count it.
    pub(crate) fn remove_element(&mut self, id: NodeId) {
        if let Some(tag) = self.tree.tag_name(id) {
            tracing::debug!(tag, "removing element");
        }
        self.tree.detach(id);
        self.report.elements_removed += 1;
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.as_element(id)
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.tree.as_element_mut(id)
    }

    fn strip_disallowed_attributes(&mut self, id: NodeId) {
        let Some(element) = self.tree.as_element_mut(id) else {
            return;
        };

        let before = element.attrs.len();
        let tag = element.tag_name.clone();
        element.attrs.retain(|attr| {
            let disallowed = is_disallowed_attribute(&attr.name, &attr.value);
            if disallowed {
                tracing::debug!(tag = %tag, attribute = %attr.name, "stripping attribute");
            }
            !disallowed
        });
        self.report.attributes_stripped += before - element.attrs.len();
    }

    fn upgrade_urls(&mut self, id: NodeId) {
        let Some(element) = self.tree.as_element_mut(id) else {
            return;
        };

        for name in URL_ATTRIBUTES {
            let Some(upgraded) = element.attr(name).and_then(upgrade_insecure_scheme) else {
                continue;
            };
            let _ = element.attrs.set(name, &upgraded);
            self.report.urls_upgraded += 1;
        }
    }
}
