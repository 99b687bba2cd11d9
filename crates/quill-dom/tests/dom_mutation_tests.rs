//! Tests for DOM tree mutation methods: remove_child, insert_before,
//! replace_node, move_children, and the ordered attribute list.

use quill_dom::{AttributesMap, DomTree, ElementData, NodeId};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc_element(ElementData::new(tag))
}

/// Helper to build `<div>` under the root with the given child tags.
fn div_with_children(tree: &mut DomTree, tags: &[&str]) -> (NodeId, Vec<NodeId>) {
    let parent = alloc_element(tree, "div");
    tree.append_child(NodeId::ROOT, parent);
    let children = tags
        .iter()
        .map(|tag| {
            let id = alloc_element(tree, tag);
            tree.append_child(parent, id);
            id
        })
        .collect();
    (parent, children)
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let (parent, children) = div_with_children(&mut tree, &["p"]);
    let child = children[0];

    tree.remove_child(parent, child);

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with_children(&mut tree, &["a", "b", "c"]);

    tree.remove_child(parent, c[1]);

    // a and c are siblings now
    assert_eq!(tree.children(parent), &[c[0], c[2]]);
    assert_eq!(tree.next_sibling(c[0]), Some(c[2]));
    assert_eq!(tree.prev_sibling(c[2]), Some(c[0]));
}

#[test]
fn test_remove_child_not_a_child_is_noop() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with_children(&mut tree, &["a"]);
    let stranger = alloc_element(&mut tree, "span");

    tree.remove_child(parent, stranger);

    assert_eq!(tree.children(parent), &[c[0]]);
}

// ========== insert_before / prepend_child ==========

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with_children(&mut tree, &["a", "c"]);
    let b = alloc_element(&mut tree, "b");

    tree.insert_before(parent, b, c[1]);

    assert_eq!(tree.children(parent), &[c[0], b, c[1]]);
    assert_eq!(tree.parent(b), Some(parent));
}

#[test]
fn test_insert_before_unknown_reference_appends() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with_children(&mut tree, &["a"]);
    let stranger = alloc_element(&mut tree, "x");
    let b = alloc_element(&mut tree, "b");

    tree.insert_before(parent, b, stranger);

    assert_eq!(tree.children(parent), &[c[0], b]);
}

#[test]
fn test_prepend_child_into_empty_and_nonempty() {
    let mut tree = DomTree::new();
    let (parent, _) = div_with_children(&mut tree, &[]);
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");

    tree.prepend_child(parent, a);
    tree.prepend_child(parent, b);

    assert_eq!(tree.children(parent), &[b, a]);
}

#[test]
fn test_append_child_moves_from_previous_parent() {
    let mut tree = DomTree::new();
    let (first, c) = div_with_children(&mut tree, &["a"]);
    let (second, _) = div_with_children(&mut tree, &[]);

    tree.append_child(second, c[0]);

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[c[0]]);
    assert_eq!(tree.parent(c[0]), Some(second));
}

// ========== replace_node / move_children ==========

#[test]
fn test_replace_node_keeps_position() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with_children(&mut tree, &["a", "img", "c"]);
    let amp = alloc_element(&mut tree, "amp-img");

    tree.replace_node(c[1], amp);

    assert_eq!(tree.children(parent), &[c[0], amp, c[2]]);
    assert_eq!(tree.parent(c[1]), None);
    assert_eq!(tree.parent(amp), Some(parent));
}

#[test]
fn test_replace_detached_node_is_noop() {
    let mut tree = DomTree::new();
    let orphan = alloc_element(&mut tree, "img");
    let amp = alloc_element(&mut tree, "amp-img");

    tree.replace_node(orphan, amp);

    assert_eq!(tree.parent(amp), None);
}

#[test]
fn test_move_children_preserves_order() {
    let mut tree = DomTree::new();
    let (from, c) = div_with_children(&mut tree, &["a", "b", "c"]);
    let (to, existing) = div_with_children(&mut tree, &["x"]);

    tree.move_children(from, to);

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing[0], c[0], c[1], c[2]]);
    for child in c {
        assert_eq!(tree.parent(child), Some(to));
    }
}

// ========== traversal ==========

#[test]
fn test_descendants_are_pre_order() {
    let mut tree = DomTree::new();
    let (div, c) = div_with_children(&mut tree, &["p", "ul"]);
    let li = alloc_element(&mut tree, "li");
    tree.append_child(c[1], li);
    let text = tree.alloc_text("hi");
    tree.append_child(c[0], text);

    let order: Vec<NodeId> = tree.descendants(div).collect();

    assert_eq!(order, vec![div, c[0], text, c[1], li]);
    assert_eq!(tree.text_content(div), "hi");
    assert!(tree.is_descendant_of(li, div));
    assert!(!tree.is_descendant_of(div, li));
}

#[test]
fn test_document_head_and_body_lookup() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(html, head);
    tree.append_child(html, body);

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.head(), Some(head));
    assert_eq!(tree.body(), Some(body));
    assert_eq!(tree.find_element(NodeId::ROOT, "body"), Some(body));
}

#[test]
fn test_fragment_has_no_head() {
    let mut tree = DomTree::new();
    let (div, _) = div_with_children(&mut tree, &["head", "body"]);

    assert_eq!(tree.document_element(), Some(div));
    assert_eq!(tree.html_element(), None);
    assert_eq!(tree.head(), None);
    assert_eq!(tree.body(), None);
}

// ========== attributes ==========

#[test]
fn test_attributes_keep_insertion_order() {
    let mut attrs = AttributesMap::new();
    let _ = attrs.set("src", "a.png");
    let _ = attrs.set("alt", "A");
    let _ = attrs.set("width", "10");

    let previous = attrs.set("alt", "B");

    assert_eq!(previous.as_deref(), Some("A"));
    assert_eq!(attrs.names().collect::<Vec<_>>(), ["src", "alt", "width"]);
    assert_eq!(attrs.get("alt"), Some("B"));
}

#[test]
fn test_attributes_push_unique_keeps_first() {
    let mut attrs = AttributesMap::new();

    assert!(attrs.push_unique("class".to_string(), "a".to_string()));
    assert!(!attrs.push_unique("class".to_string(), "b".to_string()));

    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs.get("class"), Some("a"));
}

#[test]
fn test_attributes_remove_and_retain() {
    let mut attrs: AttributesMap = [("style", "x"), ("onclick", "y"), ("id", "z")]
        .into_iter()
        .collect();

    assert_eq!(attrs.remove("style").as_deref(), Some("x"));
    assert_eq!(attrs.remove("style"), None);

    attrs.retain(|attr| !attr.name.starts_with("on"));

    assert_eq!(attrs.names().collect::<Vec<_>>(), ["id"]);
}

#[test]
fn test_set_if_missing_does_not_overwrite() {
    let mut data = ElementData::with_attrs("amp-img", [("layout", "fixed")]);

    assert!(!data.attrs.set_if_missing("layout", "responsive"));
    assert!(data.attrs.set_if_missing("width", "800"));

    assert_eq!(data.attr("layout"), Some("fixed"));
    assert_eq!(data.attr("width"), Some("800"));
    assert!(data.is_amp_element());
    assert!(data.attr_is_blank("height"));
}
