//! Parser for question text pasted from a LaTeX exam document, where the
//! stem starts at `\item` and the answer / analysis are labelled with
//! `\textbf{答案：}` / `\textbf{解析：}` (or their `**...**` Markdown forms).

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::segment::Section;
use crate::tags::extract_tags;

lazy_static! {
    static ref ANSWER_LABEL: Regex = Regex::new(r"\\textbf\{答案[：:]\}|\*\*答案[：:]\*\*").unwrap();
    static ref ANALYSIS_LABEL: Regex =
        Regex::new(r"\\textbf\{解析[：:]\}|\*\*解析[：:]\*\*").unwrap();
    static ref BLANK_RUNS: Regex = Regex::new(r"\n\s*\n").unwrap();
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLatex {
    pub content: String,
    pub answer: String,
    pub analysis: String,
    pub tags: Vec<String>,
}

impl ParsedLatex {
    fn field_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Content => &mut self.content,
            Section::Answer => &mut self.answer,
            Section::Analysis => &mut self.analysis,
        }
    }

    fn push_line(&mut self, section: Section, line: &str) {
        let field = self.field_mut(section);
        if !field.is_empty() {
            field.push('\n');
        }
        field.push_str(line);
    }
}

fn clean(text: &str) -> String {
    BLANK_RUNS.replace_all(text.trim(), "\n").trim().to_string()
}

pub fn parse_latex_document(text: &str) -> ParsedLatex {
    let mut parsed = ParsedLatex::default();
    let mut section = Section::Content;
    let mut explicit = false;
    let mut math_block: Option<String> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line == "\\begin{enumerate}" {
            continue;
        }
        if line == "\\end{enumerate}" {
            break;
        }

        if let Some(block) = math_block.as_mut() {
            block.push('\n');
            if line.contains("\\]") {
                block.push_str(&line.replacen("\\]", "$$", 1));
                if let Some(done) = math_block.take() {
                    parsed.push_line(section, &done);
                }
            } else {
                block.push_str(line);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("\\item") {
            explicit = true;
            section = Section::Content;
            parsed.content = rest.trim().to_string();
            continue;
        }
        if ANSWER_LABEL.is_match(line) {
            explicit = true;
            section = Section::Answer;
            parsed.answer = ANSWER_LABEL.replace(line, "").trim().to_string();
            continue;
        }
        if ANALYSIS_LABEL.is_match(line) {
            explicit = true;
            section = Section::Analysis;
            parsed.analysis = ANALYSIS_LABEL.replace(line, "").trim().to_string();
            continue;
        }

        if line.starts_with("\\[") {
            let opened = line.replacen("\\[", "$$", 1);
            if opened.contains("\\]") {
                parsed.push_line(section, &opened.replacen("\\]", "$$", 1));
            } else {
                math_block = Some(opened);
            }
            continue;
        }

        parsed.push_line(section, line);
    }

    // An unclosed display block still belongs to the text.
    if let Some(block) = math_block {
        parsed.push_line(section, &block);
    }

    let tags = extract_tags(text);
    if !explicit {
        return ParsedLatex {
            content: clean(text),
            tags,
            ..Default::default()
        };
    }
    ParsedLatex {
        content: clean(&parsed.content),
        answer: clean(&parsed.answer),
        analysis: clean(&parsed.analysis),
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r"\item 解方程：$2x^2 - 5x + 3 = 0$

\textbf{答案：} $x = 1$ 或 $x = \dfrac{3}{2}$

\textbf{解析：} 使用求根公式：
\[
x = \frac{5 \pm 1}{4}
\]
所以得到两个解。";

    #[test]
    fn parses_item_answer_and_analysis() {
        let parsed = parse_latex_document(EXAMPLE);
        assert_eq!(parsed.content, "解方程：$2x^2 - 5x + 3 = 0$");
        assert_eq!(parsed.answer, "$x = 1$ 或 $x = \\dfrac{3}{2}$");
        assert_eq!(
            parsed.analysis,
            "使用求根公式：\n$$\nx = \\frac{5 \\pm 1}{4}\n$$\n所以得到两个解。"
        );
    }

    #[test]
    fn markdown_labels_are_recognized() {
        let parsed = parse_latex_document("\\item 题\n**答案:** 4\n**解析：** 2+2");
        assert_eq!(parsed.answer, "4");
        assert_eq!(parsed.analysis, "2+2");
    }

    #[test]
    fn enumerate_wrapper_is_skipped_and_end_stops() {
        let parsed = parse_latex_document(
            "\\begin{enumerate}\n\\item 题一\n\\textbf{答案：} 1\n\\end{enumerate}\n\\item 题二",
        );
        assert_eq!(parsed.content, "题一");
        assert_eq!(parsed.answer, "1");
    }

    #[test]
    fn one_line_display_block() {
        let parsed = parse_latex_document("\\item 求值\n\\[ 1+1 \\]");
        assert_eq!(parsed.content, "求值\n$$ 1+1 $$");
    }

    #[test]
    fn unstructured_text_is_cleaned_content() {
        let parsed = parse_latex_document("  第一段\n\n\n第二段  ");
        assert_eq!(parsed.content, "第一段\n第二段");
        assert_eq!(parsed.answer, "");
    }

    #[test]
    fn tags_are_extracted() {
        let parsed = parse_latex_document("\\item 题\n【知识点】集合、映射");
        assert_eq!(parsed.tags, vec!["集合", "映射"]);
    }
}
