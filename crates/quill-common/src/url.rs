//! URL helpers shared by the sanitizer.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! None of these functions parse URLs fully. They operate on the raw
//! attribute strings the sanitizer sees, which may be relative, malformed,
//! or contain unescaped character references.

use std::path::{Path, PathBuf};

/// The insecure scheme prefix that [`upgrade_insecure_scheme`] rewrites.
const INSECURE_PREFIX: &str = "http://";

/// The secure replacement for [`INSECURE_PREFIX`].
const SECURE_PREFIX: &str = "https://";

/// Named character references that can spell out a URL scheme or its
/// separators. Numeric references cover everything else.
const NAMED_REFERENCES: &[(&str, char)] = &[
    ("colon", ':'),
    ("Tab", '\t'),
    ("NewLine", '\n'),
    ("sol", '/'),
    ("period", '.'),
    ("amp", '&'),
    ("AMP", '&'),
    ("nbsp", '\u{a0}'),
];

/// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
///
/// Decode one reference. `input` starts right after the `&`. Returns the
/// character and how many bytes of `input` it used.
///
/// Numeric references work with or without the trailing `;`, as browsers
/// accept both. Out-of-range code points become U+FFFD.
fn character_reference(input: &str) -> Option<(char, usize)> {
    if let Some(numeric) = input.strip_prefix('#') {
        let (radix, prefix_len) = match numeric.as_bytes().first() {
            Some(b'x' | b'X') => (16, 2),
            _ => (10, 1),
        };
        let body = &input[prefix_len..];
        let digits = body.find(|c: char| !c.is_digit(radix)).unwrap_or(body.len());
        if digits == 0 {
            return None;
        }
        let code = body[..digits]
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0u32, |acc, d| acc.saturating_mul(radix).saturating_add(d));
        let c = char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}');
        let semicolon = usize::from(body[digits..].starts_with(';'));
        return Some((c, prefix_len + digits + semicolon));
    }

    NAMED_REFERENCES.iter().find_map(|&(name, c)| {
        input
            .strip_prefix(name)
            .filter(|rest| rest.starts_with(';'))
            .map(|_| (c, name.len() + 1))
    })
}

/// Decode `raw` into characters, each paired with the byte offset in `raw`
/// just past its source text.
fn decode_with_offsets(raw: &str) -> Vec<(char, usize)> {
    let mut decoded = Vec::with_capacity(raw.len());
    let mut pos = 0;
    while let Some(c) = raw[pos..].chars().next() {
        if c == '&'
            && let Some((decoded_char, used)) = character_reference(&raw[pos + 1..])
        {
            pos += 1 + used;
            decoded.push((decoded_char, pos));
            continue;
        }
        pos += c.len_utf8();
        decoded.push((c, pos));
    }
    decoded
}

/// The value of an attribute as a browser sees it.
///
/// Attribute values are stored with character references verbatim, but
/// `href="&#106;avascript:..."` still runs script. URL policy checks must
/// look at this decoded view; the stored value is left untouched.
#[must_use]
pub fn decode_character_references(raw: &str) -> String {
    decode_with_offsets(raw).into_iter().map(|(c, _)| c).collect()
}

/// Rewrite a leading `http://` (ASCII case-insensitive) to `https://`.
///
/// The scheme is matched on the decoded value with leading C0 controls and
/// spaces and embedded tabs and newlines ignored, so `http&#58;//` and
/// `ht&Tab;tp://` are upgraded too. Everything after the prefix is kept
/// verbatim.
///
/// Returns `None` when the value does not start with the insecure prefix,
/// which covers relative URLs, `https:` URLs and every other scheme.
#[must_use]
pub fn upgrade_insecure_scheme(value: &str) -> Option<String> {
    let mut expected = INSECURE_PREFIX.chars().peekable();
    let mut leading = true;
    for (c, end) in decode_with_offsets(value) {
        if leading && (c.is_ascii_control() || c == ' ') {
            continue;
        }
        leading = false;
        if matches!(c, '\t' | '\n' | '\r') {
            continue;
        }
        if !expected.next().is_some_and(|want| c.eq_ignore_ascii_case(&want)) {
            return None;
        }
        if expected.peek().is_none() {
            return Some(format!("{SECURE_PREFIX}{}", &value[end..]));
        }
    }
    None
}

/// Whether `value` is a `javascript:` URL.
///
/// [URL Standard § 4.4](https://url.spec.whatwg.org/#concept-basic-url-parser)
/// "Remove any leading and trailing C0 control or space from input."
/// "Remove all ASCII tab or newline from input."
///
/// Browsers apply both steps after decoding character references and before
/// reading the scheme, so `" java\tscript:"` and `"javascript&colon;"` still
/// execute. The check mirrors that.
#[must_use]
pub fn is_javascript_url(value: &str) -> bool {
    let decoded = decode_character_references(value);
    let mut scheme = decoded
        .trim_start_matches(|c: char| c.is_ascii_control() || c == ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'));

    "javascript:"
        .chars()
        .all(|expected| scheme.next().is_some_and(|c| c.eq_ignore_ascii_case(&expected)))
}

/// Strip query string (`?…`) and fragment identifier (`#…`) from a URL so
/// that the remaining path can be mapped onto the filesystem.
///
/// [URL Standard § 4.1](https://url.spec.whatwg.org/#concept-url-path)
#[must_use]
pub fn strip_url_decorations(url: &str) -> &str {
    let without_fragment = url.split_once('#').map_or(url, |(b, _)| b);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(b, _)| b)
}

/// Whether `url` starts with a URL scheme (`mailto:`, `data:`, `https:`...).
///
/// [URL Standard § 4.3](https://url.spec.whatwg.org/#url-scheme-string)
/// "A URL-scheme string must be one ASCII alpha, followed by zero or more of
/// ASCII alphanumeric, U+002B (+), U+002D (-), and U+002E (.)"
#[must_use]
pub fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Repair a link URL that contains literal spaces.
///
/// Spaces are replaced with hyphens (the slug convention the site uses), then
/// any character that may not appear unescaped in a URL is percent-encoded.
/// `%` is left alone so existing escapes are not doubled.
#[must_use]
pub fn escape_url(url: &str) -> String {
    let hyphenated = url.trim().replace(' ', "-");
    let mut escaped = String::with_capacity(hyphenated.len());
    let mut buf = [0u8; 4];
    for c in hyphenated.chars() {
        if is_url_safe(c) {
            escaped.push(c);
        } else {
            escaped.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    escaped
}

/// Characters that may appear in a serialized URL without escaping.
const fn is_url_safe(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '"' | '<' | '>' | '`' | '{' | '}' | '|' | '\\' | '^')
}

/// Map an image `src` onto a file under `asset_root`.
///
/// Resolvable forms:
/// - URLs under `site_url`, with either `http` or `https` scheme
/// - root-relative paths (`/wp-content/uploads/a.png`)
/// - bare relative paths (`uploads/a.png`)
///
/// Anything else (other hosts, protocol-relative URLs, other schemes) yields
/// `None`. So does any path containing a `..` segment, so a crafted `src` can
/// never point outside the asset root.
#[must_use]
pub fn resolve_local_path(src: &str, site_url: Option<&str>, asset_root: &Path) -> Option<PathBuf> {
    let src = strip_url_decorations(src.trim());
    if src.is_empty() {
        return None;
    }

    let relative = match site_url.and_then(|base| strip_site_prefix(src, base)) {
        Some(path) => path,
        None if has_scheme(src) || src.starts_with("//") => return None,
        None => src,
    };

    let decoded = urlencoding::decode(relative).ok()?;
    let mut path = asset_root.to_path_buf();
    let mut pushed = false;
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return None,
            other => {
                path.push(other);
                pushed = true;
            }
        }
    }
    pushed.then_some(path)
}

/// If `src` lives under `site_url` (ignoring the scheme), return the path part.
fn strip_site_prefix<'a>(src: &'a str, site_url: &str) -> Option<&'a str> {
    let base = without_scheme(site_url.trim().trim_end_matches('/'))?;
    let rest = without_scheme(src)?;
    let head = rest.get(..base.len())?;
    if !head.eq_ignore_ascii_case(base) {
        return None;
    }
    let tail = &rest[base.len()..];
    (tail.is_empty() || tail.starts_with('/')).then_some(tail)
}

/// `https://example.com/x` → `example.com/x`; `//example.com/x` → `example.com/x`.
fn without_scheme(url: &str) -> Option<&str> {
    if let Some(rest) = url.strip_prefix("//") {
        return Some(rest);
    }
    let (scheme, rest) = url.split_once("://")?;
    (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrades_only_the_insecure_prefix() {
        assert_eq!(
            upgrade_insecure_scheme("http://example.com/a"),
            Some("https://example.com/a".to_string())
        );
        assert_eq!(
            upgrade_insecure_scheme("HTTP://example.com"),
            Some("https://example.com".to_string())
        );
        assert_eq!(upgrade_insecure_scheme("https://example.com"), None);
        assert_eq!(upgrade_insecure_scheme("/relative"), None);
        assert_eq!(upgrade_insecure_scheme("http:/broken"), None);
        assert_eq!(upgrade_insecure_scheme(""), None);
    }

    #[test]
    fn upgrades_encoded_insecure_prefix() {
        assert_eq!(
            upgrade_insecure_scheme("http&#58;//example.com/a?x=1&amp;y=2"),
            Some("https://example.com/a?x=1&amp;y=2".to_string())
        );
        assert_eq!(
            upgrade_insecure_scheme("&#x68;ttp&colon;&sol;&sol;example.com"),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            upgrade_insecure_scheme(" ht\ttp://example.com"),
            Some("https://example.com".to_string())
        );
        assert_eq!(upgrade_insecure_scheme("https&#58;//example.com"), None);
    }

    #[test]
    fn decodes_references_for_checks() {
        assert_eq!(decode_character_references("&#106;ava&#X73;cript&colon;"), "javascript:");
        assert_eq!(decode_character_references("&#106avascript"), "javascript");
        assert_eq!(decode_character_references("a&Tab;b&NewLine;c"), "a\tb\nc");
        assert_eq!(decode_character_references("&#99999999999;"), "\u{FFFD}");
        assert_eq!(decode_character_references("&copy; &# &colon"), "&copy; &# &colon");
        assert_eq!(decode_character_references("caf\u{e9}&amp;"), "caf\u{e9}&");
    }

    #[test]
    fn detects_encoded_javascript_urls() {
        assert!(is_javascript_url("&#106;avascript:alert(1)"));
        assert!(is_javascript_url("javascript&colon;alert(1)"));
        assert!(is_javascript_url("&#x6A;ava&Tab;script:void(0)"));
        assert!(is_javascript_url("&#0000106&#0000097vascript:alert(1)"));
        assert!(!is_javascript_url("/search?q=javascript&colon;"));
    }

    #[test]
    fn detects_obfuscated_javascript_urls() {
        assert!(is_javascript_url("javascript:alert(1)"));
        assert!(is_javascript_url("  JavaScript:void(0)"));
        assert!(is_javascript_url("java\tscript:alert(1)"));
        assert!(!is_javascript_url("https://example.com/javascript:"));
        assert!(!is_javascript_url("javascript"));
    }

    #[test]
    fn scheme_detection() {
        assert!(has_scheme("mailto:someone@example.com"));
        assert!(has_scheme("data:image/png;base64,AAAA"));
        assert!(!has_scheme("/path:with-colon"));
        assert!(!has_scheme("uploads/a.png"));
        assert!(!has_scheme("1http://nope"));
    }

    #[test]
    fn escape_replaces_spaces_and_unsafe_characters() {
        assert_eq!(escape_url("/recipes/lemon tart"), "/recipes/lemon-tart");
        assert_eq!(escape_url(" /a b\"c "), "/a-b%22c");
        assert_eq!(escape_url("/caf\u{e9} menu"), "/caf%C3%A9-menu");
        assert_eq!(escape_url("/already%20escaped"), "/already%20escaped");
    }

    #[test]
    fn resolves_site_and_relative_urls() {
        let root = Path::new("/srv/site");
        let site = Some("https://example.com/");

        assert_eq!(
            resolve_local_path("http://example.com/uploads/a.png?v=2", site, root),
            Some(PathBuf::from("/srv/site/uploads/a.png"))
        );
        assert_eq!(
            resolve_local_path("/uploads/b%20c.png", site, root),
            Some(PathBuf::from("/srv/site/uploads/b c.png"))
        );
        assert_eq!(
            resolve_local_path("img/c.png", None, root),
            Some(PathBuf::from("/srv/site/img/c.png"))
        );
    }

    #[test]
    fn refuses_remote_and_traversing_urls() {
        let root = Path::new("/srv/site");
        let site = Some("https://example.com");

        assert_eq!(resolve_local_path("https://cdn.other.com/a.png", site, root), None);
        assert_eq!(resolve_local_path("https://example.company/a.png", site, root), None);
        assert_eq!(resolve_local_path("//example.org/a.png", site, root), None);
        assert_eq!(resolve_local_path("/uploads/../../etc/passwd", site, root), None);
        assert_eq!(resolve_local_path("data:image/png;base64,AAAA", site, root), None);
        assert_eq!(resolve_local_path("", site, root), None);
        assert_eq!(resolve_local_path("/", site, root), None);
    }
}
