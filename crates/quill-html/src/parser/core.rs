use quill_common::warning::Warnings;
use quill_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

use crate::elements::is_void_element;
use crate::tokenizer::{Attribute, Token};

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// A recoverable problem found while building the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What went wrong.
    pub message: String,
    /// Index into the token stream where this issue was encountered.
    pub token_index: usize,
}

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// Default scope markers (MathML/SVG markers omitted).
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

/// "has an element in button scope": default scope markers plus button.
const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
];

/// "has an element in list item scope": default scope markers plus ol, ul.
const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol",
    "ul",
];

/// Scope for `dd`/`dt`: list item scope plus `dl`.
const DEFINITION_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol",
    "ul", "dl",
];

/// "has an element in table scope": html, table, template.
const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// Table scope plus `tr`, so a new cell only closes cells of the current row.
const ROW_SCOPE: &[&str] = &["html", "table", "template", "tr"];

/// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// Start tags that "close a p element" when one is in button scope.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "dd", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "listing", "main", "menu", "nav", "ol",
    "p", "plaintext", "pre", "search", "section", "summary", "table", "ul",
];

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a [`DomTree`] from a token stream.
///
/// NOTE: Unlike a browser, this builder never synthesizes `html`, `head` or
/// `body` and has no insertion modes. The tree mirrors the input so a
/// fragment serializes back as a fragment. What it keeps from the standard is
/// the stack of open elements and the implied end tags for `p`, `li`,
/// `dt`/`dd`, `option`, `tr` and `td`/`th`.
pub struct HTMLParser {
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Stores `NodeId`s into the arena. Empty means "insert into the document".
    stack_of_open_elements: Vec<NodeId>,

    /// DOM tree under construction.
    /// `NodeId::ROOT` (index 0) is the Document node.
    tree: DomTree,

    tokens: Vec<Token>,
    token_index: usize,
    issues: Vec<ParseIssue>,
    warnings: Warnings,
}

impl HTMLParser {
    /// Create a new parser from a token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            stack_of_open_elements: Vec::new(),
            tree: DomTree::new(),
            tokens,
            token_index: 0,
            issues: Vec::new(),
            warnings: Warnings::new("HTML Parser"),
        }
    }

    /// Get all parse issues encountered so far.
    #[must_use]
    pub fn get_issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Run the parser and return the DOM tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser and return both the `DomTree` and any parse issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.iter().enumerate() {
            self.token_index = index;
            if token.is_eof() {
                break;
            }
            self.process_token(token);
        }
        // "Stop parsing": every element still open is closed implicitly.
        self.stack_of_open_elements.clear();
        (self.tree, self.issues)
    }

    /// Record a parse warning.
    ///
    /// Logs each distinct message once per document and stores every issue
    /// for later retrieval.
    fn parse_warning(&mut self, message: &str) {
        self.warnings.warn_once(message);
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
        });
    }

    fn process_token(&mut self, token: &Token) {
        match token {
            Token::Doctype { raw } => {
                let node = self.tree.alloc(NodeType::Doctype(raw.clone()));
                self.insert_node(node);
            }
            Token::Comment { data } => {
                let node = self.tree.alloc(NodeType::Comment(data.clone()));
                self.insert_node(node);
            }
            Token::Character { data } => self.insert_character(*data),
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.handle_start_tag(name, *self_closing, attributes),
            Token::EndTag { name } => self.handle_end_tag(name),
            Token::EndOfFile => {}
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(NodeId::ROOT)
    }

    fn get_tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.tag_name(id)
    }

    fn current_tag_name(&self) -> Option<&str> {
        self.get_tag_name(self.current_node())
    }

    /// Append a node at the appropriate place for inserting a node: the end of
    /// the current node.
    fn insert_node(&mut self, node: NodeId) {
        let parent = self.current_node();
        self.tree.append_child(parent, node);
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data. Otherwise, create
    /// a new Text node whose data is data."
    fn insert_character(&mut self, c: char) {
        let parent = self.current_node();
        if let Some(last) = self.tree.last_child(parent)
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(ref mut text) = node.node_type
        {
            text.push(c);
            return;
        }
        let text = self.tree.alloc(NodeType::Text(c.to_string()));
        self.tree.append_child(parent, text);
    }

    fn attributes_to_map(attributes: &[Attribute]) -> AttributesMap {
        attributes
            .iter()
            .map(|attr| (attr.name.as_str(), attr.value.as_str()))
            .collect()
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    fn insert_html_element(&mut self, name: &str, attributes: &[Attribute]) -> NodeId {
        let element = self.tree.alloc_element(ElementData {
            tag_name: name.to_string(),
            attrs: Self::attributes_to_map(attributes),
        });
        self.insert_node(element);
        element
    }

    fn handle_start_tag(&mut self, name: &str, self_closing: bool, attributes: &[Attribute]) {
        // STEP 1: Implied end tags that a new start tag triggers.
        self.close_implied_by_start_tag(name);

        // STEP 2: Insert the element.
        let element = self.insert_html_element(name, attributes);

        // STEP 3: Void elements are never pushed, so they can't take children.
        // [§ 13.1.2.1](https://html.spec.whatwg.org/multipage/syntax.html#start-tags)
        // "On void elements, [the slash] does not mark the start tag as
        // self-closing but instead is unnecessary and has no effect of any kind."
        if is_void_element(name) {
            return;
        }
        if self_closing {
            self.parse_warning(&format!(
                "non-void-html-element-start-tag-with-trailing-solidus: <{name}/>"
            ));
        }
        self.stack_of_open_elements.push(element);
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// The subset of start-tag rules that close an open element before the new
    /// one is inserted.
    fn close_implied_by_start_tag(&mut self, name: &str) {
        match name {
            // "A start tag whose tag name is "li""
            // Close an li element in list item scope.
            "li" => self.close_element_if_in_scope(&["li"], LIST_ITEM_SCOPE),
            // "A start tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => self.close_element_if_in_scope(&["dd", "dt"], DEFINITION_SCOPE),
            // "A start tag whose tag name is one of: "optgroup", "option""
            // "If the current node is an option element, then pop the current
            // node off the stack of open elements."
            "option" | "optgroup" => {
                if self.current_tag_name() == Some("option") {
                    let _ = self.stack_of_open_elements.pop();
                }
                if name == "optgroup" && self.current_tag_name() == Some("optgroup") {
                    let _ = self.stack_of_open_elements.pop();
                }
            }
            // [§ 13.2.6.4.13](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
            // A new row closes the open row (and any cell in it).
            "tr" => self.close_element_if_in_scope(&["tr"], TABLE_SCOPE),
            // [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
            // A new cell closes the open cell of the same row.
            "td" | "th" => self.close_element_if_in_scope(&["td", "th"], ROW_SCOPE),
            _ => {}
        }

        // "If the stack of open elements has a p element in button scope, then
        // close a p element."
        if CLOSES_P.contains(&name) {
            self.close_element_if_in_scope(&["p"], BUTTON_SCOPE);
        }
    }

    /// Close the nearest element named one of `tag_names`, if it is in the
    /// scope described by `scope_markers`.
    ///
    /// NOTE: AMP custom elements (`amp-*`) also bound the search, so content
    /// the sanitizer places inside them (placeholders, fallbacks) reads back
    /// inside them.
    fn close_element_if_in_scope(&mut self, tag_names: &[&str], scope_markers: &[&str]) {
        let mut target = None;
        for &node_id in self.stack_of_open_elements.iter().rev() {
            let Some(node_tag) = self.get_tag_name(node_id) else {
                continue;
            };
            if tag_names.contains(&node_tag) {
                target = Some(node_tag.to_string());
                break;
            }
            if scope_markers.contains(&node_tag) || node_tag.starts_with("amp-") {
                break;
            }
        }

        if let Some(target) = target {
            self.generate_implied_end_tags_excluding(&target);
            self.pop_until_one_of(&[target.as_str()]);
        }
    }

    /// [§ 13.2.6.2 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "...while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element, an rp
    /// element, an rt element, or an rtc element, the user agent must pop the
    /// current node off the stack of open elements."
    ///
    /// "If a step requires the user agent to generate implied end tags but lists
    /// an element to exclude from the process, then the user agent must perform
    /// the above steps as if that element was not in the above list."
    fn generate_implied_end_tags_excluding(&mut self, exclude: &str) {
        const IMPLIED_END_TAG_ELEMENTS: &[&str] = &[
            "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
        ];

        while let Some(tag) = self.current_tag_name() {
            if IMPLIED_END_TAG_ELEMENTS.contains(&tag) && tag != exclude {
                let _ = self.stack_of_open_elements.pop();
                continue;
            }
            break;
        }
    }

    /// Pop elements until one of the given tag names is popped (inclusive).
    fn pop_until_one_of(&mut self, tag_names: &[&str]) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self
                .get_tag_name(id)
                .is_some_and(|name| tag_names.contains(&name))
            {
                break;
            }
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    fn has_element_in_specific_scope(&self, tag_name: &str, scope_markers: &[&str]) -> bool {
        for &node_id in self.stack_of_open_elements.iter().rev() {
            if let Some(node_tag) = self.get_tag_name(node_id) {
                if node_tag == tag_name {
                    return true;
                }
                if scope_markers.contains(&node_tag) {
                    return false;
                }
            }
        }
        false
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag": walk the stack; if the element is in scope pop up to
    /// and including it, otherwise ignore the token.
    fn handle_end_tag(&mut self, name: &str) {
        if is_void_element(name) {
            self.parse_warning(&format!("end tag for void element </{name}> ignored"));
            return;
        }

        let scope = match name {
            "p" => BUTTON_SCOPE,
            "li" => LIST_ITEM_SCOPE,
            "table" | "tbody" | "thead" | "tfoot" | "tr" | "caption" | "colgroup" => TABLE_SCOPE,
            "td" | "th" => ROW_SCOPE,
            _ => DEFAULT_SCOPE,
        };

        if !self.has_element_in_specific_scope(name, scope) {
            self.parse_warning(&format!("stray end tag </{name}> ignored"));
            return;
        }

        if self.current_tag_name() != Some(name) {
            self.parse_warning(&format!("end tag </{name}> closes unclosed elements"));
        }
        self.pop_until_one_of(&[name]);
    }
}

/// Print a DOM tree for debugging.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    if let Some(node) = tree.get(id) {
        match &node.node_type {
            NodeType::Document => {
                println!("{prefix}Document");
            }
            NodeType::Doctype(raw) => {
                println!("{prefix}<!{raw}>");
            }
            NodeType::Element(data) => {
                if data.attrs.is_empty() {
                    println!("{prefix}<{}>", data.tag_name);
                } else {
                    let attrs: Vec<String> = data
                        .attrs
                        .iter()
                        .map(|attr| {
                            if attr.value.is_empty() {
                                attr.name.clone()
                            } else {
                                format!("{}=\"{}\"", attr.name, attr.value)
                            }
                        })
                        .collect();
                    println!("{prefix}<{} {}>", data.tag_name, attrs.join(" "));
                }
            }
            NodeType::Text(data) => {
                let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
                println!("{prefix}\"{display}\"");
            }
            NodeType::Comment(data) => {
                println!("{prefix}<!-- {data} -->");
            }
        }
        for &child_id in tree.children(id) {
            print_tree(tree, child_id, indent + 1);
        }
    }
}
