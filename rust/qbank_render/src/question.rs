//! Question records as the question store hands them over, and the
//! sequential display ID.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::segment::SegmentedQuestion;
use crate::tags::merge_tags;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    pub id: String,
    /// Display ID, `YYYYMMDD` plus a four-digit daily counter.
    pub question_id: Option<String>,
    pub title: String,
    pub content: String,
    pub answer: String,
    pub analysis: String,
    pub grade: String,
    pub question_type: String,
    pub difficulty: u8,
    pub usage_count: u32,
    pub custom_tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            id: String::new(),
            question_id: None,
            title: String::new(),
            content: String::new(),
            answer: String::new(),
            analysis: String::new(),
            grade: String::new(),
            question_type: String::new(),
            difficulty: 1,
            usage_count: 0,
            custom_tags: Vec::new(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }
}

impl Question {
    /// Takes over the text fields of a segmentation result and adds its tags
    /// after the ones already present.
    pub fn apply_segmented(&mut self, seg: SegmentedQuestion) {
        self.content = seg.content;
        self.answer = seg.answer;
        self.analysis = seg.analysis;
        self.custom_tags = merge_tags(&self.custom_tags, seg.tags);
    }
}

/// Calendar date in Beijing time (UTC+8), which is what display IDs use.
pub fn beijing_date(t: DateTime<Utc>) -> NaiveDate {
    (t + Duration::hours(8)).date_naive()
}

fn display_id(day: NaiveDate, n: usize) -> String {
    format!("{}{n:04}", day.format("%Y%m%d"))
}

/// Display ID for a question created at `created_at`, given the questions
/// already stored. Counting starts after the questions created the same day
/// and moves past IDs that are already taken.
pub fn next_question_id(created_at: DateTime<Utc>, existing: &[Question]) -> String {
    let day = beijing_date(created_at);
    let same_day = existing
        .iter()
        .filter(|q| beijing_date(q.created_at) == day)
        .count();
    let taken: HashSet<&str> = existing
        .iter()
        .filter_map(|q| q.question_id.as_deref())
        .collect();

    let mut n = same_day + 1;
    loop {
        let candidate = display_id(day, n);
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Gives every question without a display ID one based on its rank among
/// that day's questions by creation time. Returns how many were assigned.
pub fn backfill_question_ids(questions: &mut [Question]) -> usize {
    let created: Vec<DateTime<Utc>> = questions.iter().map(|q| q.created_at).collect();
    let mut taken: HashSet<String> = questions
        .iter()
        .filter_map(|q| q.question_id.clone())
        .collect();

    let mut assigned = 0;
    for q in questions.iter_mut().filter(|q| q.question_id.is_none()) {
        let day = beijing_date(q.created_at);
        let mut n = created
            .iter()
            .filter(|t| beijing_date(**t) == day && **t <= q.created_at)
            .count();
        let mut candidate = display_id(day, n);
        while taken.contains(&candidate) {
            n += 1;
            candidate = display_id(day, n);
        }
        taken.insert(candidate.clone());
        q.question_id = Some(candidate);
        assigned += 1;
    }
    assigned
}
