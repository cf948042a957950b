//! The handful of LaTeX text-mode commands that show up in pasted question
//! text, rendered as HTML.
//!
//! Brace matching is non-greedy and does not nest: `\textbf{a {b} c}` stops at
//! the first `}`.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref ITEM: Regex = Regex::new(r"\\item([A-Za-z]*)\s*").unwrap();
    static ref TEXTBF: Regex = Regex::new(r"\\textbf\{([^}]*)\}").unwrap();
    static ref TEXTIT: Regex = Regex::new(r"\\textit\{([^}]*)\}").unwrap();
    static ref UNDERLINE: Regex = Regex::new(r"\\underline\{([^}]*)\}").unwrap();
}

pub fn render_latex_text(text: &str) -> String {
    let s = ITEM.replace_all(text, |caps: &Captures| {
        if caps[1].is_empty() {
            "• ".to_string()
        } else {
            caps[0].to_string()
        }
    });
    let s = TEXTBF.replace_all(&s, "<strong>${1}</strong>");
    let s = TEXTIT.replace_all(&s, "<em>${1}</em>");
    UNDERLINE.replace_all(&s, "<u>${1}</u>").into_owned()
}
