//! HTML tokenizer, tree builder and serializer for the Quill AMP sanitizer.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RAWTEXT, tag, attribute, comment and DOCTYPE states
//!   - Duplicate attribute removal (first occurrence wins)
//!
//! - **Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Stack of open elements, void elements, implied end tags
//!   - No synthesized `html`/`head`/`body`: fragments stay fragments
//!
//! - **Serializer** ([WHATWG § 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments))
//!
//! # Deliberately Not Implemented
//!
//! - Character reference decoding (references round-trip verbatim)
//! - Insertion modes, foster parenting, adoption agency algorithm
//! - Foreign content (SVG/MathML namespaces)
//!
//! Parsing never fails. Problems are logged once per document through
//! [`quill_common::warning::Warnings`] and, on request, returned as
//! [`ParseIssue`]s.

/// Element categories (void, raw text).
pub mod elements;
/// Tree construction.
pub mod parser;
/// Markup serialization.
pub mod serializer;
/// Tokenizer converting input into tokens.
pub mod tokenizer;

use quill_dom::DomTree;

pub use parser::{HTMLParser, ParseIssue, print_tree};
pub use serializer::{serialize, serialize_children, serialize_node};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

/// Tokenize `html` and build a tree from it.
#[must_use]
pub fn parse(html: &str) -> DomTree {
    parse_with_issues(html).0
}

/// Like [`parse`], also returning the tree builder's issues.
#[must_use]
pub fn parse_with_issues(html: &str) -> (DomTree, Vec<ParseIssue>) {
    let mut tokenizer = HTMLTokenizer::new(html);
    tokenizer.run();
    HTMLParser::new(tokenizer.into_tokens()).run_with_issues()
}
