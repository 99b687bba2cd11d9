//! HTML tokenizer module.
//!
//! Implements the subset of [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! needed to rewrite markup without changing what the author wrote.

/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Token types produced by the tokenizer.
pub mod token;
/// HTML tokenizer state machine implementation.
pub mod core;

pub use self::core::{HTMLTokenizer, TokenizerState};
pub use token::{Attribute, Token};
