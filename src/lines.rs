//! Whole-text line splitting and joining.
//!
//! Splitting recognizes the universal newline sequences `\r\n`, `\n` and
//! `\r`. Trailing empty lines are dropped, so a file ending in a line
//! terminator does not produce an extra (empty) record.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE_BREAK: Regex = Regex::new(r"\r\n|\n|\r").expect("valid line break pattern");
}

/// Split text on universal newlines.
///
/// # Examples
///
/// ```
/// use fixcol::lines::split_lines;
///
/// assert_eq!(split_lines("A\r\nB\rC\n"), vec!["A", "B", "C"]);
/// assert!(split_lines("").is_empty());
/// ```
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = LINE_BREAK.split(text).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Join lines with a separator.
#[must_use]
pub fn join_lines<S: AsRef<str>>(lines: &[S], separator: &str) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(line.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_mixed_terminators() {
        assert_eq!(split_lines("HDR\r\nA\nB\rTRL"), vec!["HDR", "A", "B", "TRL"]);
    }

    #[test]
    fn test_interior_blank_lines_kept() {
        assert_eq!(split_lines("A\n\nB\n\n"), vec!["A", "", "B"]);
    }

    #[test]
    fn test_join() {
        assert_eq!(join_lines(&["a", "b"], "\r\n"), "a\r\nb");
        assert_eq!(join_lines::<&str>(&[], "\n"), "");
    }
}
