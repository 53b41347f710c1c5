//! Width-aware text layout for terminal display.
//!
//! Widths are measured in terminal cells with `unicode-width`, so star glyphs
//! and CJK text line up with ASCII.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wraps `text` at word boundaries so no line exceeds `max_width` cells.
///
/// Words longer than a line are hard-wrapped. Empty input yields no lines.
pub(super) fn wrap_words(text: &str, max_width: usize) -> Vec<String> {
    let width = max_width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.width()
        } else {
            current.width().saturating_add(1).saturating_add(word.width())
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if word.width() > width {
            for piece in hard_wrap(word, width) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = piece;
            }
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn hard_wrap(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut used = 0_usize;
    for ch in word.chars() {
        let char_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used.saturating_add(char_width) > width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            used = 0;
        }
        piece.push(ch);
        used = used.saturating_add(char_width);
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Pads `line` with spaces, or truncates it, to exactly `width` cells.
pub(super) fn fit_to_width(line: &str, width: usize) -> String {
    let mut output = String::with_capacity(width);
    let mut used = 0_usize;

    for ch in line.chars() {
        let char_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used.saturating_add(char_width) > width {
            break;
        }
        output.push(ch);
        used = used.saturating_add(char_width);
    }

    output.push_str(&" ".repeat(width.saturating_sub(used)));
    output
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", 10, vec![])]
    #[case("short text", 20, vec!["short text"])]
    #[case("the quick brown fox", 10, vec!["the quick", "brown fox"])]
    #[case("abcdefghij", 4, vec!["abcd", "efgh", "ij"])]
    #[case("a abcdefgh", 4, vec!["a", "abcd", "efgh"])]
    fn wraps_at_word_boundaries(
        #[case] text: &str,
        #[case] width: usize,
        #[case] expected: Vec<&str>,
    ) {
        assert_eq!(wrap_words(text, width), expected);
    }

    #[rstest]
    fn wrapped_lines_respect_wide_glyphs() {
        let lines = wrap_words("★★★★★ great", 6);

        assert!(lines.iter().all(|line| line.width() <= 6), "{lines:?}");
    }

    #[rstest]
    #[case("abc", 5, "abc  ")]
    #[case("abcdef", 4, "abcd")]
    #[case("", 2, "  ")]
    fn fits_lines_to_width(#[case] line: &str, #[case] width: usize, #[case] expected: &str) {
        assert_eq!(fit_to_width(line, width), expected);
    }
}
