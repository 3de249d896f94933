//! HTML escaping for attacker-controlled record text.

/// Escapes `&`, `<`, `>`, `"` and `'` in a single pass.
///
/// Already-escaped input is escaped again (`&amp;` becomes `&amp;amp;`);
/// callers must apply this exactly once per embedding.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes an optional field, rendering `None` as `fallback`.
#[must_use]
pub fn escape_or(input: Option<&str>, fallback: &str) -> String {
    escape_html(input.unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_special_characters() {
        assert_eq!(
            escape_html(r#"<script>alert('x' & "y")</script>"#),
            "&lt;script&gt;alert(&#39;x&#39; &amp; &quot;y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn output_has_no_raw_markup_characters() {
        let escaped = escape_html("a<b>c\"d'e&f");
        for ch in ['<', '>', '"', '\''] {
            assert!(!escaped.contains(ch), "raw {ch:?} in {escaped}");
        }
        // Every remaining ampersand starts an entity.
        for (i, _) in escaped.match_indices('&') {
            let rest = &escaped[i..];
            assert!(
                ["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"]
                    .iter()
                    .any(|e| rest.starts_with(e)),
                "bare ampersand at {i} in {escaped}"
            );
        }
    }

    #[test]
    fn applies_exactly_one_pass() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_html("Flooding near Río Grande"), "Flooding near Río Grande");
    }

    #[test]
    fn escape_or_uses_fallback() {
        assert_eq!(escape_or(None, "N/A"), "N/A");
        assert_eq!(escape_or(Some("<b>"), "N/A"), "&lt;b&gt;");
    }
}
