//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - RAWTEXT helpers for raw text elements
//! - Attribute helpers for duplicate detection

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::{Attribute, Token};
use crate::elements::is_raw_text_element;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// The state the tokenizer is currently in.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Consume the next input character"
    ///
    /// Returns the character at the current position and advances the position.
    /// Returns None if we've reached the end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Peek at a codepoint at the given offset from the current position without
    /// consuming it. Used for lookahead operations like "the next few characters are".
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input[self.current_pos..].chars().nth(offset)
    }

    /// "If the next few characters are..."
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input[self.current_pos..]
            .get(..target.len())
            .is_some_and(|next| next.eq_ignore_ascii_case(target))
    }

    /// Consume the given string from the input.
    /// Caller must have already verified the characters are present.
    pub(super) const fn consume_string(&mut self, target: &str) {
        // Only ever called with ASCII targets ("--", "DOCTYPE", "[CDATA[").
        self.current_pos += target.len();
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// NOTE: CR never reaches the state machine; newlines are normalized in
    /// [`HTMLTokenizer::new`].
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Building Helpers
// =============================================================================

impl HTMLTokenizer {
    pub(super) fn append_to_tag_name(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_tag_name(c);
        }
    }

    pub(super) fn start_new_attribute(&mut self) {
        if let Some(ref mut token) = self.current_token {
            token.start_new_attribute();
        }
    }

    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_current_attribute_name(c);
        }
    }

    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_current_attribute_value(c);
        }
    }

    pub(super) fn append_to_comment(&mut self, s: &str) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_comment(s);
        }
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current token" - adds the token to the output stream.
    pub(super) fn emit_token(&mut self) {
        let Some(mut token) = self.current_token.take() else {
            return;
        };

        if let Token::StartTag {
            ref name,
            ref mut attributes,
            ..
        } = token
        {
            self.drop_duplicate_attributes(attributes);
            self.last_start_tag_name = Some(name.clone());

            // [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
            // NOTE: The tree builder would switch the tokenizer state. Since the
            // tokenizer runs first, raw text elements are detected here.
            if is_raw_text_element(name) {
                self.switch_to(TokenizerState::RawText);
            }
        }
        self.token_stream.push(token);
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.token_stream.push(Token::new_character(c));
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        self.token_stream.push(Token::EndOfFile);
        self.at_eof = true;
    }

    /// "This is an eof-in-tag parse error. Emit an end-of-file token."
    ///
    /// The unfinished tag is discarded.
    pub(super) fn eof_in_tag(&mut self) {
        self.log_parse_error("eof-in-tag");
        self.current_token = None;
        self.emit_eof_token();
    }

    /// "This is an eof-in-comment parse error. Emit the current comment token.
    /// Emit an end-of-file token."
    pub(super) fn eof_in_comment(&mut self) {
        self.log_parse_error("eof-in-comment");
        self.emit_token();
        self.emit_eof_token();
    }
}

// =============================================================================
// RAWTEXT Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        if let (Some(last_start_tag), Some(Token::EndTag { name })) =
            (&self.last_start_tag_name, &self.current_token)
        {
            return name == last_start_tag;
        }
        false
    }

    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    ///
    /// "Anything else":
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer... Reconsume in the RAWTEXT state."
    pub(super) fn emit_rawtext_end_tag_name_anything_else(&mut self) {
        // STEP 1: "Emit a U+003C LESS-THAN SIGN character token"
        self.emit_character_token('<');
        // STEP 2: "Emit a U+002F SOLIDUS character token"
        self.emit_character_token('/');
        // STEP 3: "Emit a character token for each of the characters in the temporary buffer"
        let buffer = std::mem::take(&mut self.temporary_buffer);
        for c in buffer.chars() {
            self.emit_character_token(c);
        }
        // STEP 4: Discard the current end tag token
        self.current_token = None;
        // STEP 5: "Reconsume in the RAWTEXT state"
        self.reconsume_in(TokenizerState::RawText);
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "if there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    ///
    /// Applied once at emission time, keeping the first occurrence of each name.
    fn drop_duplicate_attributes(&mut self, attributes: &mut Vec<Attribute>) {
        let before = attributes.len();
        let mut seen: Vec<String> = Vec::with_capacity(before);
        attributes.retain(|attr| {
            if seen.contains(&attr.name) {
                false
            } else {
                seen.push(attr.name.clone());
                true
            }
        });
        if attributes.len() != before {
            self.log_parse_error("duplicate-attribute");
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Logs a parse error, once per distinct code for this input.
    /// Parse errors in HTML are not fatal - the tokenizer recovers and continues.
    pub(super) fn log_parse_error(&mut self, code: &str) {
        tracing::trace!(position = self.current_pos, state = %self.state, code, "parse error");
        self.warnings.warn_once(&format!("parse error: {code}"));
    }
}
