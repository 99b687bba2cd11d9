//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Writes a [`DomTree`] back to markup.
//!
//! Text and attribute values were stored exactly as written (character
//! references included), so they are written back without escaping. The one
//! exception is `"` inside attribute values: values are always double-quoted,
//! so a literal quote (from a single-quoted or unquoted source value, or set by
//! the sanitizer) is written as `&quot;`.

use quill_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::elements::is_void_element;

/// Serialize the children of the document node.
#[must_use]
pub fn serialize(tree: &DomTree) -> String {
    serialize_children(tree, NodeId::ROOT)
}

/// Serialize the children of `id` (the node's "inner HTML").
#[must_use]
pub fn serialize_children(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        write_node(tree, child, &mut out);
    }
    out
}

/// Serialize `id` itself, including its start and end tags (the node's "outer HTML").
#[must_use]
pub fn serialize_node(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => {
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
        }
        NodeType::Doctype(raw) => {
            out.push_str("<!");
            out.push_str(raw);
            out.push('>');
        }
        NodeType::Comment(data) => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
        NodeType::Text(data) => out.push_str(data),
        NodeType::Element(data) => {
            write_start_tag(data, out);
            // "If current node is an area, base, basefont, bgsound, br, col,
            // embed, frame, hr, img, input, keygen, link, meta, param, source,
            // track or wbr element, then continue on to the next child node at
            // this point."
            if is_void_element(&data.tag_name) {
                return;
            }
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&data.tag_name);
            out.push('>');
        }
    }
}

/// `<tag a="v" b>`: attributes in stored order, empty values as bare names.
fn write_start_tag(data: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&data.tag_name);
    for attr in &data.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        if !attr.value.is_empty() {
            out.push_str("=\"");
            out.push_str(&attr.value.replace('"', "&quot;"));
            out.push('"');
        }
    }
    out.push('>');
}
