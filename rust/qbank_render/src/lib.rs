//! Rendering and segmentation core for a math question bank.
//!
//! Stored or recognized question text goes through a fixed display pipeline:
//! delimiter normalization, MathML typesetting of `$...$` / `$$...$$` spans,
//! LaTeX text commands, then a small Markdown subset. Raw OCR or pasted text
//! can be split into content / answer / analysis sections with [`segment`].

mod config;
mod error;
mod escape;
pub mod latex_doc;
pub mod latex_text;
pub mod markdown;
pub mod normalize;
pub mod paper;
pub mod pipeline;
pub mod question;
pub mod segment;
pub mod tags;
pub mod tex;

pub use config::RenderConfig;
pub use error::{ConfigError, MathError, PaperError};
pub use latex_doc::{parse_latex_document, ParsedLatex};
pub use latex_text::render_latex_text;
pub use markdown::{render_markdown, render_markdown_with};
pub use normalize::normalize;
pub use paper::{assemble_manual, assemble_random, available_tags, PaperFilter};
pub use pipeline::{render_markdown_with_latex, render_markdown_with_latex_with};
pub use question::{next_question_id, Question};
pub use segment::{segment, SegmentedQuestion, Section};
pub use tex::{render_formula, render_formula_with};
