//! Heuristic binary/text classification for decoded file content.
//!
//! Repository trees contain files that decode as UTF-8 but are not prose or
//! code (compressed blobs with lucky byte patterns, minified artifacts with
//! embedded control characters). Sampling the first 1000 characters and
//! measuring the non-printable fraction catches most of them cheaply.
//! False positives and negatives are acceptable: this gates corpus quality,
//! not correctness.

/// Default fraction of non-printable characters above which content is
/// treated as binary.
pub const DEFAULT_BINARY_THRESHOLD: f64 = 0.1;

/// Number of leading characters sampled.
const SAMPLE_CHARS: usize = 1000;

/// Returns true if `content` looks like binary data.
///
/// Counts non-printable characters other than newline, carriage return,
/// and tab within the first [`SAMPLE_CHARS`] characters and compares the
/// fraction against `threshold`. The comparison is strict: content exactly
/// at the threshold is still considered text. Empty content is never
/// binary.
pub fn looks_binary(content: &str, threshold: f64) -> bool {
    if content.is_empty() {
        return false;
    }

    let mut sampled = 0usize;
    let mut non_printable = 0usize;
    for c in content.chars().take(SAMPLE_CHARS) {
        sampled += 1;
        if is_non_printable(c) {
            non_printable += 1;
        }
    }

    non_printable as f64 / sampled as f64 > threshold
}

/// Control characters plus the invisible format and line/paragraph
/// separator code points that show up in text-decoded garbage. The stdlib
/// has no Unicode category lookup, so the format-class members seen in
/// practice are enumerated.
fn is_non_printable(c: char) -> bool {
    if matches!(c, '\n' | '\r' | '\t') {
        return false;
    }
    c.is_control()
        || matches!(
            c,
            '\u{200B}'..='\u{200F}'   // zero-width and directional marks
            | '\u{2028}' | '\u{2029}' // line/paragraph separators
            | '\u{202A}'..='\u{202E}' // bidi embedding controls
            | '\u{2060}'..='\u{2064}' // word joiner, invisible operators
            | '\u{FEFF}'              // zero-width no-break space / BOM
            | '\u{FFF9}'..='\u{FFFB}' // interlinear annotation controls
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_not_binary() {
        assert!(!looks_binary("", DEFAULT_BINARY_THRESHOLD));
    }

    #[test]
    fn test_plain_text_is_not_binary() {
        let text = "fn main() {\n    println!(\"hello\");\n}\n";
        assert!(!looks_binary(text, DEFAULT_BINARY_THRESHOLD));
    }

    #[test]
    fn test_whitespace_is_not_counted() {
        // Newlines, carriage returns, and tabs are legitimate text.
        let text = "\n\r\t".repeat(400);
        assert!(!looks_binary(&text, DEFAULT_BINARY_THRESHOLD));
    }

    #[test]
    fn test_control_heavy_content_is_binary() {
        let text = "\u{0}\u{1}\u{2}\u{3}".repeat(100);
        assert!(looks_binary(&text, DEFAULT_BINARY_THRESHOLD));
    }

    #[test]
    fn test_invisible_format_characters_count_as_non_printable() {
        // Zero-width spaces and line separators are invisible padding, not
        // text; a sample dominated by them is flagged.
        let text = "a\u{200B}\u{200B}\u{2028}".repeat(100);
        assert!(looks_binary(&text, DEFAULT_BINARY_THRESHOLD));

        // A stray zero-width joiner in otherwise normal prose is fine.
        let mut prose = "let x = 1;\n".repeat(20);
        prose.push('\u{200D}');
        assert!(!looks_binary(&prose, DEFAULT_BINARY_THRESHOLD));
    }

    #[test]
    fn test_exactly_at_threshold_is_text() {
        // 10 control chars out of 100 sampled => fraction == 0.1, not > 0.1.
        let mut text = "a".repeat(90);
        text.push_str(&"\u{0}".repeat(10));
        assert!(!looks_binary(&text, 0.1));
    }

    #[test]
    fn test_just_above_threshold_is_binary() {
        // 11 control chars out of 100 sampled => fraction 0.11 > 0.1.
        let mut text = "a".repeat(89);
        text.push_str(&"\u{0}".repeat(11));
        assert!(looks_binary(&text, 0.1));
    }

    #[test]
    fn test_only_leading_sample_is_inspected() {
        // Garbage past the first 1000 chars must not affect the verdict.
        let mut text = "a".repeat(1000);
        text.push_str(&"\u{0}".repeat(5000));
        assert!(!looks_binary(&text, DEFAULT_BINARY_THRESHOLD));
    }
}
