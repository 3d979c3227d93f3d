use regex::Regex;
use std::sync::LazyLock;

/// Characters that are rejected by at least one common filesystem.
pub const ILLEGAL_CHARS: &[char] = &['<', '>', '"', '/', '\\', '|', '*', '{', '}', '\'', '?', ':'];

const MARKUP_ESCAPES: &[(&str, &str)] = &[
    ("{\\textendash}", "-"),
    ("{\\textemdash}", "-"),
    ("{\\textunderscore}", "_"),
    ("{\\textasteriskcentered}", " "),
    ("{\\textgreater}", " "),
    ("{\\textless}", " "),
    ("\n", ""),
    ("{\\textbraceleft}", "{"),
    ("{\\textbraceright}", "}"),
    ("{\\textquotesingle}", "'"),
    ("{\\textquotedblleft}", "'"),
    ("{\\textquotedblright}", "'"),
    ("{\\textquoteleft}", "'"),
    ("{\\textquoteright}", "'"),
];

static HSPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\\hspace\{[^{}]*\}\}").expect("hspace pattern is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Turns arbitrary metadata text into something usable as a filename component.
///
/// The steps run in a fixed order:
/// 1. known markup escapes become their plain-text equivalent
/// 2. `{\cmd{inner}}` wrappers are unwrapped to `inner`
/// 3. characters in [`ILLEGAL_CHARS`] are dropped
/// 4. the rest is transliterated to ASCII
/// 5. whitespace runs collapse to a single space
///
/// No length limit is applied here, see [`sanitize_filename`].
pub fn sanitize(input: &str) -> String {
    let mut s = input.to_string();
    for (escape, plain) in MARKUP_ESCAPES {
        s = s.replace(escape, plain);
    }
    s = HSPACE.replace_all(&s, "").to_string();

    let s = unwrap_markup(&s);
    let s = strip_illegal(&s);

    // unidecode can emit quotes or slashes of its own
    let s = strip_illegal(&unidecode::unidecode(&s));
    let s: String = s
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    WHITESPACE_RUN.replace_all(&s, " ").trim().to_string()
}

/// Sanitizes and then cuts the result to at most `max_length` characters.
pub fn sanitize_filename(input: &str, max_length: usize) -> String {
    truncate(&sanitize(input), max_length).trim_end().to_string()
}

/// Character-based truncation; may cut in the middle of a word.
pub fn truncate(s: &str, max_length: usize) -> String {
    s.chars().take(max_length).collect()
}

fn strip_illegal(s: &str) -> String {
    s.chars().filter(|c| !ILLEGAL_CHARS.contains(c)).collect()
}

/// Replaces every `{\cmd{inner}}` with `inner`, nested wrappers included.
///
/// Braces that do not form a complete wrapper are left where they are.
pub fn unwrap_markup(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let closing = match_braces(&chars);

    let mut dropped = vec![false; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        match match_wrapper(&chars, &closing, i) {
            Some((inner_start, close)) => {
                dropped[i..inner_start].fill(true);
                dropped[close] = true;
                dropped[close + 1] = true;
                i = inner_start;
            }
            None => i += 1,
        }
    }

    chars
        .iter()
        .zip(dropped)
        .filter(|(_, dropped)| !dropped)
        .map(|(c, _)| *c)
        .collect()
}

/// For every `{`, the index of its matching `}`, if any.
fn match_braces(chars: &[char]) -> Vec<Option<usize>> {
    let mut closing = vec![None; chars.len()];
    let mut open = Vec::new();
    for (idx, &c) in chars.iter().enumerate() {
        match c {
            '{' => open.push(idx),
            '}' => {
                if let Some(start) = open.pop() {
                    closing[start] = Some(idx);
                }
            }
            _ => {}
        }
    }
    closing
}

/// Matches `{\cmd{...}}` starting at `start`.
/// Returns the index where the inner text starts and the index of its closing brace.
fn match_wrapper(
    chars: &[char],
    closing: &[Option<usize>],
    start: usize,
) -> Option<(usize, usize)> {
    if chars.get(start) != Some(&'{') || chars.get(start + 1) != Some(&'\\') {
        return None;
    }

    let mut open = start + 2;
    while open < chars.len()
        && chars[open] != '{'
        && chars[open] != '}'
        && !chars[open].is_whitespace()
    {
        open += 1;
    }
    if open == start + 2 || chars.get(open) != Some(&'{') {
        return None;
    }

    let close = closing[open]?;
    if chars.get(close + 1) != Some(&'}') {
        return None;
    }

    Some((open + 1, close))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_escapes_are_replaced() {
        assert_eq!(sanitize("Spin{\\textendash}orbit"), "Spin-orbit");
        assert_eq!(sanitize("a{\\textunderscore}b"), "a_b");
        assert_eq!(sanitize("line\nbreak"), "linebreak");
        assert_eq!(sanitize("x{\\hspace{2mm}}y"), "xy");
    }

    #[test]
    fn test_wrappers_are_unwrapped() {
        assert_eq!(unwrap_markup("{\\textit{Escherichia coli}}"), "Escherichia coli");
        assert_eq!(unwrap_markup("Caf{\\'{e}}"), "Cafe");
        assert_eq!(
            unwrap_markup("{\\bf{bold}} and {\\it{italic}}"),
            "bold and italic"
        );
    }

    #[test]
    fn test_nested_wrappers_unwrap_recursively() {
        assert_eq!(unwrap_markup("{\\mathrm{{\\textbf{x}}}}"), "x");
    }

    #[test]
    fn test_unbalanced_markup_is_left_alone() {
        assert_eq!(unwrap_markup("{\\textit{open"), "{\\textit{open");
        assert_eq!(unwrap_markup("{\\cmd{a} b}"), "{\\cmd{a} b}");
        assert_eq!(sanitize("{\\textit{open"), "textitopen");
    }

    #[test]
    fn test_deeply_nested_markup() {
        let depth = 100_000;
        let nested = format!("{}x{}", "{\\a{".repeat(depth), "}}".repeat(depth));
        assert_eq!(unwrap_markup(&nested), "x");

        let unbalanced = "{\\x{".repeat(depth);
        assert_eq!(unwrap_markup(&unbalanced), unbalanced);
    }

    #[test]
    fn test_illegal_characters_are_removed() {
        assert_eq!(sanitize("a<b>c\"d/e\\f|g*h{i}j'k?l:m"), "abcdefghijklm");
    }

    #[test]
    fn test_non_ascii_is_transliterated() {
        assert_eq!(sanitize("Schrödinger équation"), "Schrodinger equation");
        assert!(sanitize("“quoted” ‘text’ — naïve").is_ascii());
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(sanitize("a   b\t\tc"), "a b c");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "Spin{\\textendash}orbit: a “review” of Schrödinger's cat?",
            "{\\textit{Nature}}  Physics / Letters",
            "  plain  ",
            "∫ x² dx ≈ ∞",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
            let bounded = sanitize_filename(input, 7);
            assert_eq!(sanitize_filename(&bounded, 7), bounded);
        }
    }

    #[test]
    fn test_output_has_no_illegal_or_non_ascii_characters() {
        let out = sanitize("«Über» <b>Fête</b> “quoted” 東京 \\ / ? : *");
        assert!(out.is_ascii());
        assert!(!out.contains(ILLEGAL_CHARS));
    }

    #[test]
    fn test_sanitize_filename_truncates_by_characters() {
        assert_eq!(sanitize_filename("abcdefghij", 4), "abcd");
        assert_eq!(sanitize_filename("ab cd", 3), "ab");
        assert!(sanitize_filename(&"word ".repeat(100), 250).chars().count() <= 250);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("ééé", 2), "éé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
