//! Document-level AMP requirements.
//!
//! [AMP § Required markup](https://amp.dev/documentation/guides-and-tutorials/learn/spec/amphtml#required-markup)
//!
//! "AMP HTML documents MUST
//! - contain a top-level `<html ⚡>` tag (`<html amp>` is accepted as well).
//! - contain `<head>` and `<body>` tags.
//! - contain a `<link rel="canonical" href="$SOME_URL">` tag inside their head.
//! - contain a `<meta charset="utf-8">` tag as the first child of their head tag.
//! - contain a `<meta name="viewport" content="width=device-width">` tag inside their head tag.
//! - contain a `<script async src="https://cdn.ampproject.org/v0.js"></script>` tag inside their head tag.
//! - contain the AMP boilerplate code in their head tag."
//!
//! Every step checks for what is already there, so finishing a finished page
//! changes nothing.

use quill_dom::{ElementData, NodeId};

use crate::engine::Pass;
use crate::rules::{
    AMP_CDN, AMP_EXTENSIONS, AMP_RUNTIME_SRC, BOILERPLATE_CSS, BOILERPLATE_NOSCRIPT_CSS,
    VIEWPORT_CONTENT, extension_script_src, has_token,
};

/// Inline script types AMP permits (structured data).
const ALLOWED_INLINE_SCRIPT_TYPES: &[&str] = &["application/ld+json", "application/json"];

/// `custom-template` script for `<template type="amp-mustache">`.
const MUSTACHE_TEMPLATE: &str = "amp-mustache";

/// `src` of the mustache template script (only published as 0.2).
const MUSTACHE_SCRIPT_SRC: &str = "https://cdn.ampproject.org/v0/amp-mustache-0.2.js";

/// Whether a `<script>` may stay in an AMP page.
fn is_allowed_script(element: &ElementData) -> bool {
    if let Some(src) = element.attr("src") {
        return src.trim().starts_with(AMP_CDN);
    }
    element.attr("type").is_some_and(|t| {
        ALLOWED_INLINE_SCRIPT_TYPES
            .iter()
            .any(|allowed| t.trim().eq_ignore_ascii_case(allowed))
    })
}

impl Pass<'_> {
    /// Add what a complete AMP page needs. Without a `<head>` only the
    /// `<html>` marker and script removal apply.
    pub(crate) fn finish_page(&mut self) {
        self.mark_html_element();
        self.remove_non_amp_resources();

        let Some(head) = self.tree.head() else {
            tracing::debug!("page has no <head>; skipping head requirements");
            return;
        };

        let charset = self.ensure_charset(head);
        self.ensure_viewport(head, charset);
        self.ensure_canonical(head);
        self.ensure_scripts(head);
        self.ensure_boilerplate(head);
    }

    /// `<html>` gets the `amp` attribute unless it has `amp` or `⚡`.
    fn mark_html_element(&mut self) {
        let Some(html) = self.tree.document_element() else {
            return;
        };
        if let Some(element) = self.element_mut(html)
            && element.tag_name == "html"
            && !element.attrs.contains("amp")
            && !element.attrs.contains("\u{26a1}")
        {
            let _ = element.attrs.set("amp", "");
        }
    }

    /// Drop scripts AMP does not run and author stylesheets.
    fn remove_non_amp_resources(&mut self) {
        let doomed: Vec<NodeId> = self
            .tree
            .descendants(NodeId::ROOT)
            .filter(|&id| {
                self.element(id).is_some_and(|e| match e.tag_name.as_str() {
                    "script" => !is_allowed_script(e),
                    "link" => e.attr("rel").is_some_and(|rel| has_token(rel, "stylesheet")),
                    _ => false,
                })
            })
            .collect();

        for id in doomed {
            self.remove_element(id);
        }
    }

    /// `<meta charset>` as the first child of `<head>`. Returns it.
    fn ensure_charset(&mut self, head: NodeId) -> NodeId {
        let existing = self
            .tree
            .children(head)
            .iter()
            .copied()
            .find(|&id| self.is_element_with(id, "meta", |e| e.attrs.contains("charset")));

        let meta = existing.unwrap_or_else(|| {
            self.tree
                .alloc_element(ElementData::with_attrs("meta", [("charset", "utf-8")]))
        });
        if self.tree.first_child(head) != Some(meta) {
            self.tree.prepend_child(head, meta);
        }
        meta
    }

    /// `<meta name="viewport">`, placed right after the charset.
    fn ensure_viewport(&mut self, head: NodeId, charset: NodeId) {
        let exists = self.tree.children(head).iter().any(|&id| {
            self.is_element_with(id, "meta", |e| {
                e.attr("name")
                    .is_some_and(|n| n.trim().eq_ignore_ascii_case("viewport"))
            })
        });
        if exists {
            return;
        }

        let meta = self.tree.alloc_element(ElementData::with_attrs(
            "meta",
            [("name", "viewport"), ("content", VIEWPORT_CONTENT)],
        ));
        match self.tree.next_sibling(charset) {
            Some(next) => self.tree.insert_before(head, meta, next),
            None => self.tree.append_child(head, meta),
        }
    }

    /// `<link rel="canonical">` when a canonical URL is configured.
    fn ensure_canonical(&mut self, head: NodeId) {
        let Some(url) = self.config.canonical_url.clone() else {
            return;
        };
        let exists = self.tree.children(head).iter().any(|&id| {
            self.is_element_with(id, "link", |e| {
                e.attr("rel").is_some_and(|rel| has_token(rel, "canonical"))
            })
        });
        if !exists {
            let link = self.tree.alloc_element(ElementData::with_attrs(
                "link",
                [("rel", "canonical"), ("href", url.as_str())],
            ));
            self.tree.append_child(head, link);
        }
    }

    /// The runtime script plus one script per AMP extension in use.
    fn ensure_scripts(&mut self, head: NodeId) {
        let scripts: Vec<ElementData> = self
            .tree
            .elements_by_tag_name(head, "script")
            .into_iter()
            .filter_map(|id| self.element(id).cloned())
            .collect();
        let has_script = |attr: &str, value: &str| {
            scripts
                .iter()
                .any(|s| s.attr(attr).is_some_and(|v| v.trim() == value))
        };

        let mut wanted: Vec<ElementData> = Vec::new();
        if !has_script("src", AMP_RUNTIME_SRC) {
            wanted.push(ElementData::with_attrs(
                "script",
                [("async", ""), ("src", AMP_RUNTIME_SRC)],
            ));
        }

        for &extension in AMP_EXTENSIONS {
            if self.uses_extension(extension) && !has_script("custom-element", extension) {
                let src = extension_script_src(extension);
                wanted.push(ElementData::with_attrs(
                    "script",
                    [("async", ""), ("custom-element", extension), ("src", src.as_str())],
                ));
            }
        }

        if self.uses_mustache_templates() && !has_script("custom-template", MUSTACHE_TEMPLATE) {
            wanted.push(ElementData::with_attrs(
                "script",
                [
                    ("async", ""),
                    ("custom-template", MUSTACHE_TEMPLATE),
                    ("src", MUSTACHE_SCRIPT_SRC),
                ],
            ));
        }

        for data in wanted {
            let script = self.tree.alloc_element(data);
            self.tree.append_child(head, script);
        }
    }

    /// Whether the document contains an element that needs `extension`.
    fn uses_extension(&self, extension: &str) -> bool {
        let tag = if extension == "amp-form" { "form" } else { extension };
        self.tree.find_element(NodeId::ROOT, tag).is_some()
    }

    fn uses_mustache_templates(&self) -> bool {
        self.tree
            .elements_by_tag_name(NodeId::ROOT, "template")
            .into_iter()
            .any(|id| {
                self.element(id)
                    .and_then(|e| e.attr("type"))
                    .is_some_and(|t| t.trim() == MUSTACHE_TEMPLATE)
            })
    }

    /// `<style amp-boilerplate>` and its `<noscript>` companion.
    fn ensure_boilerplate(&mut self, head: NodeId) {
        let mut has_style = false;
        let mut has_noscript = false;
        for id in self.tree.elements_by_tag_name(head, "style") {
            if !self.is_element_with(id, "style", |e| e.attrs.contains("amp-boilerplate")) {
                continue;
            }
            let in_noscript = self
                .tree
                .parent(id)
                .is_some_and(|parent| self.tree.tag_name(parent) == Some("noscript"));
            if in_noscript {
                has_noscript = true;
            } else {
                has_style = true;
            }
        }

        if !has_style {
            let style = self.boilerplate_style(BOILERPLATE_CSS);
            self.tree.append_child(head, style);
        }
        if !has_noscript {
            let noscript = self.tree.alloc_element(ElementData::new("noscript"));
            let style = self.boilerplate_style(BOILERPLATE_NOSCRIPT_CSS);
            self.tree.append_child(noscript, style);
            self.tree.append_child(head, noscript);
        }
    }

    fn boilerplate_style(&mut self, css: &str) -> NodeId {
        let style = self
            .tree
            .alloc_element(ElementData::with_attrs("style", [("amp-boilerplate", "")]));
        let text = self.tree.alloc_text(css);
        self.tree.append_child(style, text);
        style
    }

    fn is_element_with(&self, id: NodeId, tag: &str, predicate: impl Fn(&ElementData) -> bool) -> bool {
        self.element(id)
            .is_some_and(|e| e.tag_name == tag && predicate(e))
    }
}
