//! Delimiter scanner splitting paragraph text into segments.

use super::{Formula, Segment};

/// Split paragraph text into literal and formula segments.
///
/// `$$...$$` is tried before `$...$` at every position; the shortest span
/// wins and no span crosses a line break. A `$` without a closing delimiter
/// stays literal. When no span is found the result is a single literal
/// holding the whole text, meaning the paragraph needs no change.
pub fn locate(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'$' {
            pos += 1;
            continue;
        }

        let Some(end) = span_end(bytes, pos) else {
            pos += 1;
            continue;
        };

        push_literal(&mut segments, &text[literal_start..pos]);
        let span = &text[pos..end];
        match Formula::from_span(span) {
            Some(formula) => segments.push(Segment::Formula(formula)),
            None => segments.push(Segment::Literal(span)),
        }
        pos = end;
        literal_start = end;
    }

    if segments.is_empty() {
        return vec![Segment::Literal(text)];
    }

    push_literal(&mut segments, &text[literal_start..]);
    segments
}

/// Check whether the text holds at least one convertible formula.
pub fn has_formula(text: &str) -> bool {
    text.contains('$') && locate(text).iter().any(Segment::is_formula)
}

fn push_literal<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Literal(text));
    }
}

/// End offset (exclusive) of the delimited span opening at `start`.
fn span_end(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start + 1) == Some(&b'$') {
        let mut i = start + 2;
        while i + 1 < bytes.len() && bytes[i] != b'\n' {
            if bytes[i] == b'$' && bytes[i + 1] == b'$' {
                return Some(i + 2);
            }
            i += 1;
        }
    }

    // '$' and '\n' are ASCII, so byte offsets always land on char boundaries.
    bytes[start + 1..]
        .iter()
        .take_while(|&&b| b != b'\n')
        .position(|&b| b == b'$')
        .map(|offset| start + 1 + offset + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::reconstruct;

    fn formulas<'a>(segments: &[Segment<'a>]) -> Vec<&'a str> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Formula(f) => Some(f.latex),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_no_delimiter() {
        let segments = locate("plain paragraph");
        assert_eq!(segments, vec![Segment::Literal("plain paragraph")]);
        assert!(!has_formula("plain paragraph"));
    }

    #[test]
    fn test_inline_formula_with_cjk() {
        let text = "已知 $f(x)=x^2$，求导";
        let segments = locate(text);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Literal("已知 "));
        assert_eq!(formulas(&segments), vec!["f(x)=x^2"]);
        assert_eq!(segments[2], Segment::Literal("，求导"));
    }

    #[test]
    fn test_display_checked_first() {
        let segments = locate("a $$x+y$$ b");
        match segments[1] {
            Segment::Formula(f) => {
                assert_eq!(f.source, "$$x+y$$");
                assert_eq!(f.latex, "x+y");
                assert!(f.display);
            }
            _ => panic!("expected formula"),
        }
    }

    #[test]
    fn test_empty_display_formula_is_literal() {
        let segments = locate("$$");
        assert_eq!(segments, vec![Segment::Literal("$$")]);
        assert!(!has_formula("$$"));
    }

    #[test]
    fn test_unmatched_dollar() {
        let text = "cost is $5 total";
        assert_eq!(locate(text), vec![Segment::Literal(text)]);
    }

    #[test]
    fn test_first_match_wins() {
        let segments = locate("$a$b$c$");
        assert_eq!(segments.len(), 3);
        assert_eq!(formulas(&segments), vec!["a", "c"]);
        assert_eq!(segments[1], Segment::Literal("b"));
    }

    #[test]
    fn test_odd_dollar_count_leaves_trailing_orphan() {
        let segments = locate("$x$ and $");
        assert_eq!(segments.last(), Some(&Segment::Literal(" and $")));
    }

    #[test]
    fn test_adjacent_spans_drop_empty_literals() {
        let segments = locate("$a$$b$");
        // "$a$$b$": "$a$" then "$b$" with nothing between them.
        assert_eq!(formulas(&segments), vec!["a", "b"]);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_unclosed_display_falls_back_to_inline() {
        // No closing "$$", so "$$" itself matches as an empty inline span.
        let segments = locate("$$a$");
        assert_eq!(segments[0], Segment::Literal("$$"));
        assert_eq!(segments[1], Segment::Literal("a$"));
    }

    #[test]
    fn test_span_does_not_cross_line_break() {
        let text = "$a\nb$";
        assert_eq!(locate(text), vec![Segment::Literal(text)]);
    }

    #[test]
    fn test_reconstruction() {
        let inputs = [
            "",
            "$",
            "$$",
            "$$$",
            "已知 $f(x)=x^2$，求导",
            "$a$b$c$",
            "x $$ \\int_0^1 f $$ y $z",
            "tab\t$x$\nnext $y$",
            "$$a$b$$ tail",
        ];
        for input in inputs {
            assert_eq!(reconstruct(&locate(input)), input, "input: {:?}", input);
        }
    }
}
