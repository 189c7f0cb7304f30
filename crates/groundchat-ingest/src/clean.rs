//! Text normalization applied to parsed content before chunking.

/// Collapses whitespace runs to a single space and normalizes comma spacing
/// (no space before, exactly one after). Idempotent: cleaning cleaned text
/// is a no-op.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            while out.ends_with(' ') {
                out.pop();
            }
            out.push(',');
            while chars.peek() == Some(&' ') {
                chars.next();
            }
            if chars.peek().is_some() {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(clean_text("hello   world\n\tfoo"), "hello world foo");
    }

    #[test]
    fn normalizes_comma_spacing() {
        assert_eq!(clean_text("a ,b"), "a, b");
        assert_eq!(clean_text("a,   b"), "a, b");
        assert_eq!(clean_text("a , b"), "a, b");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(clean_text("  padded  "), "padded");
    }

    #[test]
    fn is_idempotent() {
        let samples = ["a ,b,c  ,  d", "  x\n\ny , z ", "plain text", "trailing,"];
        for s in samples {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n\t "), "");
    }
}
