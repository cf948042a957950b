//! Splits raw recognized or pasted text into question content, answer and
//! analysis using line keywords.
//!
//! Classification is a three-state machine driven by [`next_section`];
//! accumulation is kept separate in [`segment`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tags::extract_tags;

lazy_static! {
    static ref CHOICE_OPTION: Regex = Regex::new(r"^[A-D][\s.,、]").unwrap();
    static ref CIRCLED_NUMBER: Regex = Regex::new(r"^[①②③④⑤⑥⑦⑧⑨⑩]").unwrap();
}

const ANSWER_MARKERS: &[&str] = &["答案", "答：", "答:", "解：", "解:"];
const ANALYSIS_MARKERS: &[&str] = &["解析", "分析", "说明", "过程", "步骤"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Content,
    Answer,
    Analysis,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentedQuestion {
    pub content: String,
    pub answer: String,
    pub analysis: String,
    pub tags: Vec<String>,
}

pub fn is_answer_marker(line: &str) -> bool {
    ANSWER_MARKERS.iter().any(|m| line.contains(m))
        || CHOICE_OPTION.is_match(line)
        || CIRCLED_NUMBER.is_match(line)
}

pub fn is_analysis_marker(line: &str) -> bool {
    ANALYSIS_MARKERS.iter().any(|m| line.contains(m))
}

/// Section that `line` (already trimmed) belongs to, given the section of
/// the line before it.
///
/// An answer marker only moves out of `Content`. An analysis marker always
/// wins, from any state.
pub fn next_section(state: Section, line: &str) -> Section {
    if is_analysis_marker(line) {
        return Section::Analysis;
    }
    if state == Section::Content && is_answer_marker(line) {
        return Section::Answer;
    }
    state
}

/// Never fails. When neither an answer nor an analysis line is found the
/// whole input, untouched, becomes `content`.
pub fn segment(raw: &str) -> SegmentedQuestion {
    let mut content: Vec<&str> = Vec::new();
    let mut answer: Vec<&str> = Vec::new();
    let mut analysis: Vec<&str> = Vec::new();

    let mut state = Section::Content;
    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        state = next_section(state, line);
        match state {
            Section::Content => content.push(line),
            Section::Answer => answer.push(line),
            Section::Analysis => analysis.push(line),
        }
    }

    let tags = extract_tags(raw);
    if answer.is_empty() && analysis.is_empty() {
        return SegmentedQuestion {
            content: raw.to_string(),
            tags,
            ..Default::default()
        };
    }
    SegmentedQuestion {
        content: content.join("\n"),
        answer: answer.join("\n"),
        analysis: analysis.join("\n"),
        tags,
    }
}
