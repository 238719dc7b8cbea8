use std::borrow::Cow;

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'') || !is_xml_char(c)
}

/// Drops characters that cannot appear in an XML document at all.
pub fn sanitize_xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

/// Escapes text for use in element content or a quoted attribute value.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_xml_char(c) => escaped.push(c),
            _ => {}
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{escape_xml, sanitize_xml_text};

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape_xml("能源/電力"), Cow::Borrowed(_)));
        assert!(matches!(sanitize_xml_text("⏳ ok"), Cow::Borrowed(_)));
    }

    #[test]
    fn control_chars_are_dropped() {
        assert_eq!(sanitize_xml_text("a\u{0007}b\u{000C}c"), "abc");
        assert_eq!(escape_xml("<\u{0001}>"), "&lt;&gt;");
    }

    #[test]
    fn markup_chars_are_escaped() {
        assert_eq!(
            escape_xml(r#"R&D <"x"> 'y'"#),
            "R&amp;D &lt;&quot;x&quot;&gt; &apos;y&apos;"
        );
    }
}
