//! Ordered element attribute list.
//!
//! [§ 4.9.2 Interface NamedNodeMap](https://dom.spec.whatwg.org/#interface-namednodemap)
//!
//! "A NamedNodeMap has an associated element... and an attribute list, which
//! is the element's attribute list."
//!
//! Order matters here: the serializer writes attributes back in the order the
//! author wrote them, so the map is a `Vec` rather than a hash map. Elements
//! rarely carry more than a handful of attributes, which keeps linear lookup
//! cheap.

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "An attribute has a local name", lowercased by the parser.
    pub name: String,
    /// "An attribute has a value", stored exactly as written.
    pub value: String,
}

/// Insertion-ordered attribute list with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributesMap {
    entries: Vec<Attribute>,
}

impl AttributesMap {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the element has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// [§ 4.9 get an attribute by name](https://dom.spec.whatwg.org/#concept-element-attributes-get-by-name)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Whether an attribute named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|attr| attr.name == name)
    }

    /// [§ 4.9 set an attribute value](https://dom.spec.whatwg.org/#concept-element-attributes-set-value)
    ///
    /// Replaces the value in place if the attribute exists, otherwise appends.
    /// Returns the previous value.
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        if let Some(attr) = self.entries.iter_mut().find(|attr| attr.name == name) {
            return Some(std::mem::replace(&mut attr.value, value.to_string()));
        }
        self.entries.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        None
    }

    /// Set `name` only if it is not already present. Returns true if the
    /// attribute was added.
    pub fn set_if_missing(&mut self, name: &str, value: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        let _ = self.set(name, value);
        true
    }

    /// Append an attribute unless one with the same name already exists.
    ///
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    /// "if there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    ///
    /// Returns false for a duplicate.
    pub fn push_unique(&mut self, name: String, value: String) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.entries.push(Attribute { name, value });
        true
    }

    /// [§ 4.9 remove an attribute by name](https://dom.spec.whatwg.org/#concept-element-attributes-remove-by-name)
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|attr| attr.name == name)?;
        Some(self.entries.remove(index).value)
    }

    /// Keep only the attributes for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Attribute) -> bool) {
        self.entries.retain(|attr| keep(attr));
    }

    /// Iterate over attributes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.entries.iter()
    }

    /// Attribute names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|attr| attr.name.as_str())
    }
}

impl<'a> IntoIterator for &'a AttributesMap {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for AttributesMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            let _ = map.push_unique(name.into(), value.into());
        }
        map
    }
}
