//! Rewrites the LaTeX delimiter styles found in pasted and recognized text
//! into canonical `$...$` (inline) and `$$...$$` (block) math.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref BLOCK_MATH: Regex = Regex::new(r"(?s)\$\$(.*?)\$\$").unwrap();
    static ref INLINE_MATH: Regex = Regex::new(r"\$([^$]+?)\$").unwrap();
    static ref ESCAPED_DOLLAR: Regex = Regex::new(r"\\\$(.*?)\\\$").unwrap();
    static ref BRACKET: Regex = Regex::new(r"(?s)\[(.*?)\]").unwrap();
    static ref PAREN_INLINE: Regex = Regex::new(r"(?s)\\\((.*?)\\\)").unwrap();
    static ref BRACKET_DISPLAY: Regex = Regex::new(r"(?s)\\\[(.*?)\\\]").unwrap();
    static ref EQUATION_ENV: Regex =
        Regex::new(r"(?s)\\begin\{equation\*?\}(.*?)\\end\{equation\*?\}").unwrap();
    static ref ALIGN_ENV: Regex =
        Regex::new(r"(?s)\\begin\{align\*?\}(.*?)\\end\{align\*?\}").unwrap();
    static ref CASES_ENV: Regex = Regex::new(r"(?s)\\begin\{cases\}(.*?)\\end\{cases\}").unwrap();
    static ref PLACEHOLDER_LINE: Regex = Regex::new(r"(?m)^\s*\\_\s*$").unwrap();
    static ref RUN_OF_BACKSLASHES: Regex = Regex::new(r"\\{3,}").unwrap();
    static ref TRAILING_BREAK: Regex = Regex::new(r"\\\s*$").unwrap();
    static ref COLUMN_SEP: Regex = Regex::new(r"\s*&\s*").unwrap();
}

/// A canonical math span found in normalized text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MathSpan {
    /// Byte range including the delimiters.
    pub range: Range<usize>,
    /// Byte range of the formula between the delimiters.
    pub inner: Range<usize>,
    pub display: bool,
}

/// Finds `$$...$$` spans first, then `$...$` spans in the gaps between them,
/// so an inline match can never straddle a block delimiter.
pub fn math_spans(text: &str) -> Vec<MathSpan> {
    fn inline_in(text: &str, gap: Range<usize>, spans: &mut Vec<MathSpan>) {
        for caps in INLINE_MATH.captures_iter(&text[gap.clone()]) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            spans.push(MathSpan {
                range: gap.start + whole.start()..gap.start + whole.end(),
                inner: gap.start + inner.start()..gap.start + inner.end(),
                display: false,
            });
        }
    }

    let mut spans = Vec::new();
    let mut last = 0;
    for caps in BLOCK_MATH.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        inline_in(text, last..whole.start(), &mut spans);
        spans.push(MathSpan {
            range: whole.range(),
            inner: inner.range(),
            display: true,
        });
        last = whole.end();
    }
    inline_in(text, last..text.len(), &mut spans);
    spans
}

type Step = fn(&str) -> String;

/// Applied in order, each only to the text between canonical math spans.
const TEXT_STEPS: &[Step] = &[
    bracket_to_block,
    paren_to_inline,
    display_to_block,
    environments_to_block,
    cases_to_set_builder,
];

/// Normalizes every supported math delimiter style to `$...$` / `$$...$$`.
///
/// Never fails; text that is already canonical comes back unchanged.
pub fn normalize(text: &str) -> String {
    let mut s = strip_invisible(text);
    s = escaped_dollar_to_block(&s);
    for step in TEXT_STEPS {
        s = outside_math(&s, *step);
    }
    s
}

fn outside_math(text: &str, step: Step) -> String {
    let spans = math_spans(text);
    if spans.is_empty() {
        return step(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&step(&text[last..span.range.start]));
        out.push_str(&text[span.range.clone()]);
        last = span.range.end;
    }
    out.push_str(&step(&text[last..]));
    out
}

pub fn strip_invisible(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'))
        .map(|c| if c == '\u{00A0}' { ' ' } else { c })
        .collect()
}

/// `\$x\$` marks a formula in some OCR output.
pub fn escaped_dollar_to_block(text: &str) -> String {
    ESCAPED_DOLLAR
        .replace_all(text, |caps: &Captures| {
            let formula = caps[1].trim();
            let formula = formula.strip_suffix('\\').unwrap_or(formula).trim_end();
            format!("$${formula}$$")
        })
        .into_owned()
}

/// `[...]` becomes block math only when the content has a backslash.
///
/// This is a heuristic: bracketed prose that happens to contain a backslash
/// is converted too. `\[` is left for [`display_to_block`].
pub fn bracket_to_block(text: &str) -> String {
    BRACKET
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            let start = caps.get(0).map_or(0, |m| m.start());
            if text[..start].ends_with('\\') {
                return whole.to_string();
            }
            let formula = caps[1].trim();
            if formula.contains('\\') {
                format!("$${formula}$$")
            } else {
                whole.to_string()
            }
        })
        .into_owned()
}

pub fn paren_to_inline(text: &str) -> String {
    PAREN_INLINE
        .replace_all(text, |caps: &Captures| format!("${}$", &caps[1]))
        .into_owned()
}

pub fn display_to_block(text: &str) -> String {
    BRACKET_DISPLAY
        .replace_all(text, |caps: &Captures| format!("$${}$$", &caps[1]))
        .into_owned()
}

pub fn environments_to_block(text: &str) -> String {
    let s = EQUATION_ENV.replace_all(text, |caps: &Captures| format!("$${}$$", &caps[1]));
    ALIGN_ENV
        .replace_all(&s, |caps: &Captures| format!("$${}$$", &caps[1]))
        .into_owned()
}

/// OCR tends to read set-builder notation `{ x | P(x) }` as a two-column
/// `cases` environment. Rebuild it as `$\{ left \mid right \}$`; bodies that
/// do not split into columns are passed through as block math.
pub fn cases_to_set_builder(text: &str) -> String {
    CASES_ENV
        .replace_all(text, |caps: &Captures| {
            let inner = PLACEHOLDER_LINE.replace_all(&caps[1], "");
            let inner = RUN_OF_BACKSLASHES.replace_all(&inner, "\\");
            let inner = inner.trim().replace('|', " & ");
            let inner = TRAILING_BREAK.replace(&inner, "");
            let inner = inner.trim();

            let parts: Vec<&str> = COLUMN_SEP.split(inner).collect();
            if parts.len() >= 2 {
                let left = parts[0].trim();
                let right = parts[1..].join(" & ");
                format!("$\\{{ {left} \\mid {} \\}}$", right.trim())
            } else {
                format!("$${inner}$$")
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn strips_zero_width_and_nbsp() {
        assert_eq!(normalize("a\u{200B}b\u{FEFF}c\u{00A0}d"), "abc d");
    }

    #[test]
    fn escaped_dollars_become_block_and_drop_trailing_backslash() {
        assert_eq!(normalize(r"see \$ x^2 \\$ here"), r"see $$x^2$$ here");
        assert_eq!(normalize(r"\$a+b\$"), "$$a+b$$");
    }

    #[test]
    fn bracket_with_backslash_becomes_block() {
        assert_eq!(normalize(r"[ \frac{1}{2} ]"), r"$$\frac{1}{2}$$");
    }

    #[test]
    fn bracket_prose_is_left_alone() {
        assert_eq!(normalize("选项 [A] 正确"), "选项 [A] 正确");
    }

    #[test]
    fn paren_and_display_delimiters() {
        assert_eq!(normalize(r"令 \(x>0\)"), "令 $x>0$");
        assert_eq!(normalize(r"\[ x = \frac{-b}{2a} \]"), r"$$ x = \frac{-b}{2a} $$");
    }

    #[test]
    fn equation_and_align_environments() {
        assert_eq!(
            normalize(r"\begin{equation}E=mc^2\end{equation}"),
            "$$E=mc^2$$"
        );
        assert_eq!(
            normalize("\\begin{align}a&=b\\end{align}"),
            "$$a&=b$$"
        );
    }

    #[test]
    fn cases_with_bar_becomes_set_builder() {
        let out = normalize(r"\begin{cases}x+y | x>0\end{cases}");
        assert_eq!(out, r"$\{ x+y \mid x>0 \}$");
    }

    #[test]
    fn cases_with_single_column_falls_back_to_block() {
        let out = normalize(r"\begin{cases}x^2\end{cases}");
        assert_eq!(out, "$$x^2$$");
    }

    #[test]
    fn cases_drops_placeholder_lines_and_backslash_runs() {
        let out = normalize("\\begin{cases}\n\\_\nx & x \\in A \\\\\\\n\\end{cases}");
        assert_eq!(out, r"$\{ x \mid x \in A \}$");
    }

    #[test]
    fn canonical_math_is_untouched() {
        let canonical = r"已知 $f(x)=[\alpha, \beta]$ 且 $$\sum_{i=1}^{n} i$$ 成立";
        assert_eq!(normalize(canonical), canonical);
    }

    #[test]
    fn spans_prefer_blocks() {
        let spans = math_spans("$a$ and $$b$$ and $c$");
        let kinds: Vec<bool> = spans.iter().map(|s| s.display).collect();
        assert_eq!(kinds, vec![false, true, false]);
    }
}
