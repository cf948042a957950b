//! The display pipeline: normalize, typeset math, LaTeX text commands,
//! Markdown. Math is lifted out into numbered jobs before any text pass runs
//! and its markup is substituted back last, so the text passes never see
//! rendered MathML or error spans.

use tracing::{trace, warn};

use crate::config::RenderConfig;
use crate::escape::esc_text;
use crate::latex_text::render_latex_text;
use crate::markdown::render_markdown_with;
use crate::normalize::{math_spans, normalize};
use crate::tex::render_formula_with;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TexJob {
    pub id: usize,
    pub latex: String,
    pub display: bool,
}

/// Escaped text with a placeholder comment where each formula was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedText {
    pub html: String,
    pub jobs: Vec<TexJob>,
}

fn placeholder_for(id: usize) -> String {
    format!("<!--QB_TEX_{id}-->")
}

/// Normalizes `text` and swaps every canonical math span for a placeholder.
/// Block spans are found before inline ones.
pub fn prepare(text: &str) -> PreparedText {
    let normalized = normalize(text);
    let mut out = String::with_capacity(normalized.len() + 64);
    let mut jobs: Vec<TexJob> = Vec::new();
    let mut last = 0;

    for span in math_spans(&normalized) {
        out.push_str(&esc_text(&normalized[last..span.range.start]));
        let latex = &normalized[span.inner.clone()];
        if latex.trim().is_empty() {
            out.push_str(&esc_text(&normalized[span.range.clone()]));
        } else {
            let id = jobs.len();
            jobs.push(TexJob {
                id,
                latex: latex.to_string(),
                display: span.display,
            });
            out.push_str(&placeholder_for(id));
        }
        last = span.range.end;
    }
    out.push_str(&esc_text(&normalized[last..]));

    PreparedText { html: out, jobs }
}

/// Replaces each `QB_TEX_n` placeholder with `rendered[n]`.
pub fn apply_math(html: &str, rendered: &[String]) -> String {
    if !html.contains("<!--QB_TEX_") {
        return html.to_string();
    }

    let mut out = html.to_string();
    let mut missing: Vec<usize> = Vec::new();
    for (idx, markup) in rendered.iter().enumerate() {
        let marker = placeholder_for(idx);
        if !out.contains(&marker) {
            missing.push(idx);
            continue;
        }
        out = out.replace(&marker, markup);
    }
    if !missing.is_empty() {
        warn!(?missing, "math placeholders lost during rendering");
    }
    out
}

pub fn render_markdown_with_latex_with(text: &str, cfg: &RenderConfig) -> String {
    if text.is_empty() {
        return String::new();
    }
    let prepared = prepare(text);
    trace!(jobs = prepared.jobs.len(), "extracted math jobs");

    let rendered: Vec<String> = prepared
        .jobs
        .iter()
        .map(|job| render_formula_with(&job.latex, job.display, cfg))
        .collect();

    let html = render_latex_text(&prepared.html);
    let html = render_markdown_with(&html, cfg);
    apply_math(&html, &rendered)
}

/// Renders stored or recognized question text to display HTML.
pub fn render_markdown_with_latex(text: &str) -> String {
    render_markdown_with_latex_with(text, RenderConfig::shared())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_extracts_block_before_inline() {
        let prepared = prepare("设 $a$，则 $$a^2$$ 且 $b$");
        assert_eq!(prepared.jobs.len(), 3);
        assert!(prepared.jobs[1].display);
        assert_eq!(prepared.jobs[1].latex, "a^2");
        assert_eq!(
            prepared.html,
            "设 <!--QB_TEX_0-->，则 <!--QB_TEX_1--> 且 <!--QB_TEX_2-->"
        );
    }

    #[test]
    fn prepare_escapes_plain_text() {
        let prepared = prepare("a < b & <script>");
        assert_eq!(prepared.html, "a &lt; b &amp; &lt;script&gt;");
        assert!(prepared.jobs.is_empty());
    }

    #[test]
    fn blank_formula_is_kept_as_text() {
        let prepared = prepare("价格 $$ $$ 元");
        assert!(prepared.jobs.is_empty());
        assert_eq!(prepared.html, "价格 $$ $$ 元");
    }

    #[test]
    fn prepare_normalizes_first() {
        let prepared = prepare("\\(x\\) 与 \\[y\\]");
        assert_eq!(prepared.jobs.len(), 2);
        assert!(!prepared.jobs[0].display);
        assert!(prepared.jobs[1].display);
    }

    #[test]
    fn apply_math_replaces_markers() {
        let out = apply_math(
            "<p><!--QB_TEX_0--> <!--QB_TEX_1--></p>",
            &["A".to_string(), "B".to_string()],
        );
        assert_eq!(out, "<p>A B</p>");
    }

    #[test]
    fn apply_math_keeps_going_past_missing_markers() {
        let out = apply_math("<!--QB_TEX_1-->", &["A".to_string(), "B".to_string()]);
        assert_eq!(out, "B");
    }

    #[test]
    fn markdown_does_not_touch_rendered_math() {
        // The error span keeps `**` from the source; bold must not apply to it.
        let out = render_markdown_with_latex("**粗体** $\\frac{**$");
        assert!(out.starts_with("<strong>粗体</strong> "));
        assert!(out.contains("math-error"));
        assert!(out.contains("\\frac{**"));
    }

    #[test]
    fn empty_text_renders_empty() {
        assert_eq!(render_markdown_with_latex(""), "");
    }
}
