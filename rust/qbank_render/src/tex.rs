//! Single-formula typesetting: TeX source to MathML via `latex2mathml`.

use std::collections::BTreeMap;

use latex2mathml::{latex_to_mathml, DisplayStyle};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use crate::config::RenderConfig;
use crate::error::MathError;
use crate::escape::{esc_attr, esc_text};

lazy_static! {
    // A backslash followed by either a command name or one escaped char, so
    // `\\RR` reads as a row break then `RR` rather than a macro.
    static ref COMMAND: Regex = Regex::new(r"(?s)\\([A-Za-z]+|.)").unwrap();
}

/// Rewrites `\NAME` commands listed in `macros`; other commands are kept.
pub fn expand_macros(latex: &str, macros: &BTreeMap<String, String>) -> String {
    if macros.is_empty() {
        return latex.to_string();
    }
    COMMAND
        .replace_all(latex, |caps: &Captures| match macros.get(&caps[1]) {
            Some(expansion) => expansion.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn strip_parse_error_mtext(mathml: &str) -> String {
    // latex2mathml can emit <mtext>[PARSE ERROR: ...]</mtext> for a single
    // unknown token while the rest of the tree is still usable.
    let mut out = mathml.to_string();
    let start_pat = "<mtext>[PARSE ERROR:";
    let end_pat = "</mtext>";
    loop {
        let Some(s) = out.find(start_pat) else {
            break;
        };
        let Some(e_rel) = out[s..].find(end_pat) else {
            break;
        };
        let e = s + e_rel + end_pat.len();
        out.replace_range(s..e, "");
    }
    out
}

/// Typesets one formula, reporting failure instead of masking it.
pub fn tex_to_mathml(latex: &str, display: bool, cfg: &RenderConfig) -> Result<String, MathError> {
    let formula = latex.trim();
    // Trailing backslash is a common OCR artifact.
    let formula = formula.strip_suffix('\\').unwrap_or(formula);
    if formula.trim().is_empty() {
        return Err(MathError::Empty);
    }

    let style = if display {
        DisplayStyle::Block
    } else {
        DisplayStyle::Inline
    };
    let expanded = expand_macros(formula, &cfg.macros);
    let mathml =
        latex_to_mathml(&expanded, style).map_err(|e| MathError::Parse(e.to_string()))?;
    let cleaned = strip_parse_error_mtext(&mathml);
    if cleaned.contains("[PARSE ERROR:") {
        return Err(MathError::Unsupported);
    }
    Ok(cleaned)
}

fn mode_class(display: bool) -> &'static str {
    if display {
        "math-display"
    } else {
        "math-inline"
    }
}

fn error_span(latex: &str, err: &MathError, display: bool, cfg: &RenderConfig) -> String {
    format!(
        r#"<span class="math math-error {}" style="color: {};" title="{}">{}</span>"#,
        mode_class(display),
        esc_attr(&cfg.error_color),
        esc_attr(&err.to_string()),
        esc_text(latex)
    )
}

/// Renders one formula to HTML. Never fails: a formula the engine rejects
/// comes back as a colored span holding its source text exactly as given.
pub fn render_formula_with(formula: &str, display: bool, cfg: &RenderConfig) -> String {
    if formula.trim().is_empty() {
        return String::new();
    }
    match tex_to_mathml(formula, display, cfg) {
        Ok(mathml) => format!(r#"<span class="math {}">{mathml}</span>"#, mode_class(display)),
        Err(err) => {
            debug!(error = %err, formula, "formula rendered as error span");
            error_span(formula, &err, display, cfg)
        }
    }
}

pub fn render_formula(formula: &str, display: bool) -> String {
    render_formula_with(formula, display, RenderConfig::shared())
}
