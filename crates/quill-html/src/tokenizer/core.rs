use quill_common::warning::Warnings;
use strum_macros::Display;

use super::token::Token;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. Each state corresponds to a section in § 13.2.5.
///
/// NOTE: Character reference states are absent. References are kept verbatim
/// in text and attribute values so they round-trip through the serializer
/// untouched. RCDATA, RAWTEXT and script data collapse into one
/// [`TokenizerState::RawText`] family for the same reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RawText,
    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    RawTextLessThanSign,
    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    RawTextEndTagOpen,
    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    RawTextEndTagName,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    CommentStart,
    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    CommentStartDash,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    CommentEndBang,
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    ///
    /// Collapses the DOCTYPE name and identifier states: everything up to the
    /// next `>` is kept as raw declaration text.
    Doctype,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// This struct maintains the state machine for tokenizing HTML input into tokens.
pub struct HTMLTokenizer {
    pub(super) state: TokenizerState,
    pub(super) input: String,
    pub(super) current_pos: usize,
    pub(super) current_input_character: Option<char>,
    pub(super) current_token: Option<Token>,
    pub(super) at_eof: bool,
    pub(super) token_stream: Vec<Token>,
    // When true, the next iteration of the main loop will not consume a new character.
    // "Reconsume in the X state" sets this flag.
    pub(super) reconsume: bool,

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    /// "The last start tag token emitted is used as part of the tree construction stage
    /// and in the RCDATA, RAWTEXT, and script data states."
    pub(super) last_start_tag_name: Option<String>,

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#temporary-buffer)
    /// "The temporary buffer is used to temporarily store characters during certain
    /// tokenization operations, particularly for end tag detection in RCDATA/RAWTEXT states."
    pub(super) temporary_buffer: String,

    /// Parse errors already logged for this input.
    pub(super) warnings: Warnings,
}

impl HTMLTokenizer {
    /// Create a new tokenizer for the given input.
    ///
    /// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
    /// "Before the tokenization stage, the input stream must be preprocessed by
    /// normalizing newlines."
    #[must_use]
    pub fn new(input: &str) -> Self {
        let input = input.replace("\r\n", "\n").replace('\r', "\n");
        // "The initial state is the data state."
        Self {
            state: TokenizerState::Data,
            input,
            current_pos: 0,
            current_input_character: None,
            current_token: None,
            at_eof: false,
            token_stream: Vec::new(),
            reconsume: false,
            last_start_tag_name: None,
            temporary_buffer: String::new(),
            warnings: Warnings::new("HTML Tokenizer"),
        }
    }

    /// Consume the tokenizer and return the token stream.
    /// Call this after [`HTMLTokenizer::run`] to get the tokens for the parser.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    /// Run the state machine until an end-of-file token has been emitted.
    pub fn run(&mut self) {
        while !self.at_eof {
            // [§ 13.2.5.42](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
            // The markup declaration open state inspects "the next few
            // characters" instead of consuming one.
            if self.state == TokenizerState::MarkupDeclarationOpen {
                self.handle_markup_declaration_open_state();
                continue;
            }

            // Each state begins by consuming the next input character,
            // unless we're reconsuming from a previous state transition.
            if self.reconsume {
                self.reconsume = false;
            } else {
                self.current_input_character = self.consume();
            }

            match self.state {
                TokenizerState::Data => self.handle_data_state(),
                TokenizerState::RawText => self.handle_rawtext_state(),
                TokenizerState::RawTextLessThanSign => self.handle_rawtext_less_than_sign_state(),
                TokenizerState::RawTextEndTagOpen => self.handle_rawtext_end_tag_open_state(),
                TokenizerState::RawTextEndTagName => self.handle_rawtext_end_tag_name_state(),
                TokenizerState::TagOpen => self.handle_tag_open_state(),
                TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
                TokenizerState::TagName => self.handle_tag_name_state(),
                TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
                TokenizerState::AttributeName => self.handle_attribute_name_state(),
                TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
                TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
                TokenizerState::AttributeValueDoubleQuoted => {
                    self.handle_attribute_value_quoted_state('"');
                }
                TokenizerState::AttributeValueSingleQuoted => {
                    self.handle_attribute_value_quoted_state('\'');
                }
                TokenizerState::AttributeValueUnquoted => {
                    self.handle_attribute_value_unquoted_state();
                }
                TokenizerState::AfterAttributeValueQuoted => {
                    self.handle_after_attribute_value_quoted_state();
                }
                TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
                TokenizerState::BogusComment => self.handle_bogus_comment_state(),
                TokenizerState::CommentStart => self.handle_comment_start_state(),
                TokenizerState::CommentStartDash => self.handle_comment_start_dash_state(),
                TokenizerState::Comment => self.handle_comment_state(),
                TokenizerState::CommentEndDash => self.handle_comment_end_dash_state(),
                TokenizerState::CommentEnd => self.handle_comment_end_state(),
                TokenizerState::CommentEndBang => self.handle_comment_end_bang_state(),
                TokenizerState::Doctype => self.handle_doctype_state(),
                TokenizerState::MarkupDeclarationOpen => {}
            }
        }
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self) {
        match self.current_input_character {
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => self.switch_to(TokenizerState::TagOpen),
            // "EOF - Emit an end-of-file token."
            None => self.emit_eof_token(),
            // "Anything else - Emit the current input character as a character token."
            // NOTE: U+0026 AMPERSAND is emitted as-is; references stay verbatim.
            Some(c) => self.emit_character_token(c),
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    fn handle_rawtext_state(&mut self) {
        match self.current_input_character {
            // "U+003C LESS-THAN SIGN (<)"
            // "Switch to the RAWTEXT less-than sign state."
            Some('<') => self.switch_to(TokenizerState::RawTextLessThanSign),
            // "EOF"
            // "Emit an end-of-file token."
            None => self.emit_eof_token(),
            // "Anything else"
            // "Emit the current input character as a character token."
            Some(c) => self.emit_character_token(c),
        }
    }

    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    fn handle_rawtext_less_than_sign_state(&mut self) {
        match self.current_input_character {
            // "U+002F SOLIDUS (/)"
            // "Set the temporary buffer to the empty string. Switch to the RAWTEXT end tag open state."
            Some('/') => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::RawTextEndTagOpen);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token. Reconsume in the RAWTEXT state."
            _ => {
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::RawText);
            }
        }
    }

    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    fn handle_rawtext_end_tag_open_state(&mut self) {
        match self.current_input_character {
            // "ASCII alpha"
            // "Create a new end tag token, set its tag name to the empty string.
            // Reconsume in the RAWTEXT end tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::RawTextEndTagName);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token and a U+002F SOLIDUS
            // character token. Reconsume in the RAWTEXT state."
            _ => {
                self.emit_character_token('<');
                self.emit_character_token('/');
                self.reconsume_in(TokenizerState::RawText);
            }
        }
    }

    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    fn handle_rawtext_end_tag_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION (tab)", "U+000A LINE FEED (LF)",
            // "U+000C FORM FEED (FF)", "U+0020 SPACE"
            // "If the current end tag token is an appropriate end tag token, then
            // switch to the before attribute name state."
            Some(c) if Self::is_whitespace_char(c) && self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "U+002F SOLIDUS (/)"
            // "If the current end tag token is an appropriate end tag token, then
            // switch to the self-closing start tag state."
            Some('/') if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "If the current end tag token is an appropriate end tag token, then
            // switch to the data state and emit the current tag token."
            Some('>') if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "ASCII alpha"
            // "Append the lowercase version of the current input character to the
            // current tag token's tag name. Append the current input character to
            // the temporary buffer."
            Some(c) if c.is_ascii_alphabetic() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c.to_ascii_lowercase());
                }
                self.temporary_buffer.push(c);
            }
            // "Anything else"
            _ => self.emit_rawtext_end_tag_name_anything_else(),
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            // "U+0021 EXCLAMATION MARK (!)"
            // "Switch to the markup declaration open state."
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/)"
            // "Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            // "ASCII alpha"
            // "Create a new start tag token, set its tag name to the empty string.
            // Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003F QUESTION MARK (?)"
            // "This is an unexpected-question-mark-instead-of-tag-name parse error.
            // Create a comment token whose data is the empty string. Reconsume in
            // the bogus comment state."
            Some('?') => {
                self.log_parse_error("unexpected-question-mark-instead-of-tag-name");
                self.current_token = Some(Token::new_comment(String::new()));
                self.reconsume_in(TokenizerState::BogusComment);
            }
            // "EOF"
            // "This is an eof-before-tag-name parse error. Emit a U+003C LESS-THAN
            // SIGN character token and an end-of-file token."
            None => {
                self.log_parse_error("eof-before-tag-name");
                self.emit_character_token('<');
                self.emit_eof_token();
            }
            // "Anything else"
            // "This is an invalid-first-character-of-tag-name parse error. Emit a
            // U+003C LESS-THAN SIGN character token. Reconsume in the data state."
            Some(_) => {
                self.log_parse_error("invalid-first-character-of-tag-name");
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            // "ASCII alpha"
            // "Create a new end tag token, set its tag name to the empty string.
            // Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "This is a missing-end-tag-name parse error. Switch to the data state."
            Some('>') => {
                self.log_parse_error("missing-end-tag-name");
                self.switch_to(TokenizerState::Data);
            }
            // "EOF"
            // "This is an eof-before-tag-name parse error. Emit a U+003C LESS-THAN
            // SIGN character token, a U+002F SOLIDUS character token and an
            // end-of-file token."
            None => {
                self.log_parse_error("eof-before-tag-name");
                self.emit_character_token('<');
                self.emit_character_token('/');
                self.emit_eof_token();
            }
            // "Anything else"
            // "This is an invalid-first-character-of-tag-name parse error. Create a
            // comment token whose data is the empty string. Reconsume in the bogus
            // comment state."
            Some(_) => {
                self.log_parse_error("invalid-first-character-of-tag-name");
                self.current_token = Some(Token::new_comment(String::new()));
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            // "Switch to the before attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "Switch to the self-closing start tag state."
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            // "Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "This is an unexpected-null-character parse error. Append a U+FFFD
            // REPLACEMENT CHARACTER character to the current tag token's tag name."
            Some('\0') => {
                self.log_parse_error("unexpected-null-character");
                self.append_to_tag_name('\u{FFFD}');
            }
            // "This is an eof-in-tag parse error. Emit an end-of-file token."
            None => self.eof_in_tag(),
            // "ASCII upper alpha": append the lowercase version.
            // "Anything else": append the current input character.
            Some(c) => self.append_to_tag_name(c.to_ascii_lowercase()),
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF"
            // "Reconsume in the after attribute name state."
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "This is an unexpected-equals-sign-before-attribute-name parse error.
            // Start a new attribute in the current tag token. Set that attribute's
            // name to the current input character, and its value to the empty
            // string. Switch to the attribute name state."
            Some('=') => {
                self.log_parse_error("unexpected-equals-sign-before-attribute-name");
                self.start_new_attribute();
                self.append_to_attribute_name('=');
                self.switch_to(TokenizerState::AttributeName);
            }
            // "Start a new attribute in the current tag token. Set that attribute
            // name and value to the empty string. Reconsume in the attribute name
            // state."
            Some(_) => {
                self.start_new_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "Reconsume in the after attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "Switch to the before attribute value state."
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('\0') => {
                self.log_parse_error("unexpected-null-character");
                self.append_to_attribute_name('\u{FFFD}');
            }
            // "This is an unexpected-character-in-attribute-name parse error.
            // Treat it as per the "anything else" entry below."
            Some(c @ ('"' | '\'' | '<')) => {
                self.log_parse_error("unexpected-character-in-attribute-name");
                self.append_to_attribute_name(c);
            }
            // "ASCII upper alpha": append the lowercase version.
            Some(c) => self.append_to_attribute_name(c.to_ascii_lowercase()),
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_tag(),
            Some(_) => {
                self.start_new_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            // "This is a missing-attribute-value parse error. Switch to the data
            // state. Emit the current tag token."
            Some('>') => {
                self.log_parse_error("missing-attribute-value");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            _ => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
        }
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    ///
    /// The two quoted states differ only in their closing quote.
    fn handle_attribute_value_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            // "Switch to the after attribute value (quoted) state."
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            Some('\0') => {
                self.log_parse_error("unexpected-null-character");
                self.append_to_attribute_value('\u{FFFD}');
            }
            None => self.eof_in_tag(),
            Some(c) => self.append_to_attribute_value(c),
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('\0') => {
                self.log_parse_error("unexpected-null-character");
                self.append_to_attribute_value('\u{FFFD}');
            }
            // "This is an unexpected-character-in-unquoted-attribute-value parse
            // error. Treat it as per the "anything else" entry below."
            Some(c @ ('"' | '\'' | '<' | '=' | '`')) => {
                self.log_parse_error("unexpected-character-in-unquoted-attribute-value");
                self.append_to_attribute_value(c);
            }
            None => self.eof_in_tag(),
            Some(c) => self.append_to_attribute_value(c),
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_tag(),
            // "This is a missing-whitespace-between-attributes parse error.
            // Reconsume in the before attribute name state."
            Some(_) => {
                self.log_parse_error("missing-whitespace-between-attributes");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            // "Set the self-closing flag of the current tag token. Switch to the
            // data state. Emit the current tag token."
            Some('>') => {
                if let Some(ref mut token) = self.current_token {
                    token.set_self_closing();
                }
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_tag(),
            // "This is an unexpected-solidus-in-tag parse error. Reconsume in the
            // before attribute name state."
            Some(_) => {
                self.log_parse_error("unexpected-solidus-in-tag");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            // "Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "Emit the comment. Emit an end-of-file token."
            None => {
                self.emit_token();
                self.emit_eof_token();
            }
            Some('\0') => self.append_to_comment("\u{FFFD}"),
            Some(c) => self.append_to_comment(c.encode_utf8(&mut [0; 4])),
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn handle_markup_declaration_open_state(&mut self) {
        // "Two U+002D HYPHEN-MINUS characters (-)"
        // "Consume those two characters, create a comment token whose data is
        // the empty string, and switch to the comment start state."
        if self.next_few_characters_are("--") {
            self.consume_string("--");
            self.current_token = Some(Token::new_comment(String::new()));
            self.switch_to(TokenizerState::CommentStart);
        }
        // "ASCII case-insensitive match for the word "DOCTYPE""
        // "Consume those characters and switch to the DOCTYPE state."
        else if self.next_few_characters_are_case_insensitive("DOCTYPE") {
            let keyword = self.input[self.current_pos..self.current_pos + 7].to_string();
            self.consume_string("DOCTYPE");
            self.current_token = Some(Token::new_doctype(keyword));
            self.switch_to(TokenizerState::Doctype);
        }
        // "The string "[CDATA[""
        // Outside foreign content: "this is a cdata-in-html-content parse error.
        // Create a comment token whose data is the "[CDATA[" string. Switch to
        // the bogus comment state."
        else if self.next_few_characters_are("[CDATA[") {
            self.log_parse_error("cdata-in-html-content");
            self.consume_string("[CDATA[");
            self.current_token = Some(Token::new_comment("[CDATA[".to_string()));
            self.switch_to(TokenizerState::BogusComment);
        }
        // "Anything else"
        // "This is an incorrectly-opened-comment parse error. Create a comment
        // token whose data is the empty string. Switch to the bogus comment
        // state (don't consume anything in the current state)."
        else {
            self.log_parse_error("incorrectly-opened-comment");
            self.current_token = Some(Token::new_comment(String::new()));
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    fn handle_comment_start_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            // "This is an abrupt-closing-of-empty-comment parse error. Switch to
            // the data state. Emit the current comment token."
            Some('>') => {
                self.log_parse_error("abrupt-closing-of-empty-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    fn handle_comment_start_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') => {
                self.log_parse_error("abrupt-closing-of-empty-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_comment(),
            // "Append a U+002D HYPHEN-MINUS character (-) to the comment token's
            // data. Reconsume in the comment state."
            Some(_) => {
                self.append_to_comment("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    ///
    /// NOTE: The comment less-than sign states only report nested-comment parse
    /// errors and never change the data, so `<` is appended directly.
    fn handle_comment_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            Some('\0') => {
                self.log_parse_error("unexpected-null-character");
                self.append_to_comment("\u{FFFD}");
            }
            None => self.eof_in_comment(),
            Some(c) => self.append_to_comment(c.encode_utf8(&mut [0; 4])),
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    fn handle_comment_end_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    fn handle_comment_end_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('!') => self.switch_to(TokenizerState::CommentEndBang),
            Some('-') => self.append_to_comment("-"),
            None => self.eof_in_comment(),
            // "Append two U+002D HYPHEN-MINUS characters (-) to the comment
            // token's data. Reconsume in the comment state."
            Some(_) => {
                self.append_to_comment("--");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    fn handle_comment_end_bang_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.append_to_comment("--!");
                self.switch_to(TokenizerState::CommentEndDash);
            }
            // "This is an incorrectly-closed-comment parse error. Switch to the
            // data state. Emit the current comment token."
            Some('>') => {
                self.log_parse_error("incorrectly-closed-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("--!");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "This is an eof-in-doctype parse error... Emit the current token.
            // Emit an end-of-file token."
            None => {
                self.log_parse_error("eof-in-doctype");
                self.emit_token();
                self.emit_eof_token();
            }
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_doctype(c);
                }
            }
        }
    }
}
