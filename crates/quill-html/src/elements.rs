//! Element categories that change how markup is tokenized, built and written.

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr"
///
/// `param` and `keygen` are obsolete but still void in browsers.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#raw-text-elements)
///
/// Elements whose content is kept verbatim up to the matching end tag.
///
/// NOTE: `iframe` is deliberately absent. Its content is parsed as markup, so
/// a rewritten `amp-iframe` with a placeholder child reads back the same way.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title", "xmp"];

/// Whether `tag_name` is a void element.
#[must_use]
pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

/// Whether `tag_name` is a raw text element.
#[must_use]
pub fn is_raw_text_element(tag_name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag_name)
}
