/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// An attribute on a start tag token.
///
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value", exactly as written (character references are not decoded)
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// DOCTYPE token.
    ///
    /// NOTE: The name and identifiers are not split out. The raw declaration
    /// (everything between `<!` and `>`) is kept so it serializes unchanged.
    Doctype {
        /// The declaration text, e.g. `DOCTYPE html`.
        raw: String,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes, each of which has a name and a value."
    StartTag {
        /// "a tag name"
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes on end tags are dropped.
    EndTag {
        /// "a tag name"
        name: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// "Comment and character tokens have data."
    Character {
        /// "data"
        data: char,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    #[must_use]
    pub const fn new_doctype(raw: String) -> Self {
        Self::Doctype { raw }
    }

    /// "When a start or end tag token is created, its self-closing flag must be
    /// unset (its other state is that it be set), and its attributes list must
    /// be empty."
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// Create a new end tag token with an empty name.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
        }
    }

    /// Create a new comment token with the given data.
    #[must_use]
    pub const fn new_comment(data: String) -> Self {
        Self::Comment { data }
    }

    /// Create a character token with the given character.
    #[must_use]
    pub const fn new_character(c: char) -> Self {
        Self::Character { data: c }
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    // Mutation helpers for the tokenizer state machine. Calling one on the
    // wrong token variant is a no-op: end tags silently swallow attributes.

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the current input character to the current tag token's tag name."
    pub fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name } = self {
            name.push(c);
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    ///
    /// "Set the self-closing flag of the current tag token."
    pub fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// "Start a new attribute in the current tag token. Set that attribute
    /// name and value to the empty string."
    pub fn start_new_attribute(&mut self) {
        if let Self::StartTag { attributes, .. } = self {
            attributes.push(Attribute::new(String::new(), String::new()));
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "Append the current input character to the current attribute's name."
    pub fn append_to_current_attribute_name(&mut self, c: char) {
        if let Self::StartTag { attributes, .. } = self
            && let Some(attr) = attributes.last_mut()
        {
            attr.name.push(c);
        }
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    ///
    /// "Append the current input character to the current attribute's value."
    pub fn append_to_current_attribute_value(&mut self, c: char) {
        if let Self::StartTag { attributes, .. } = self
            && let Some(attr) = attributes.last_mut()
        {
            attr.value.push(c);
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    ///
    /// "Append the current input character to the comment token's data."
    pub fn append_to_comment(&mut self, s: &str) {
        if let Self::Comment { data } = self {
            data.push_str(s);
        }
    }

    /// Append a character to the raw DOCTYPE declaration.
    pub fn append_to_doctype(&mut self, c: char) {
        if let Self::Doctype { raw } = self {
            raw.push(c);
        }
    }
}
