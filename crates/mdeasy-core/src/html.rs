//! Entity escaping for attribute values.

use std::borrow::Cow;

/// Longest entity name considered before giving up.
const MAX_ENTITY_LEN: usize = 10;

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode character references in an attribute value.
///
/// Handles the named entities a Markdown renderer emits and numeric
/// references. Anything unrecognised is kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&rest[1..=end]).map(|c| (c, end + 2)));

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("plain.md"), "plain.md");
        assert_eq!(unescape("it&#x27;s.md"), "it's.md");
        assert_eq!(unescape("a&amp;b.md?x=1&amp;y=2"), "a&b.md?x=1&y=2");
        assert_eq!(unescape("&quot;&#39;&lt;&gt;"), "\"'<>");
    }

    #[test]
    fn test_unescape_keeps_unknown_references() {
        assert_eq!(unescape("a & b"), "a & b");
        assert_eq!(unescape("&bogus;"), "&bogus;");
        assert_eq!(unescape("&#xzz;"), "&#xzz;");
        assert_eq!(unescape("trailing&"), "trailing&");
        assert_eq!(unescape("&amp"), "&amp");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("docs/a.md"), "docs/a.md");
        assert_eq!(escape_attr("it's & \"x\""), "it&#39;s &amp; &quot;x&quot;");
    }
}
