//! Paper assembly over an in-memory question list: manual picks, or a random
//! draw from the questions that pass a filter.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PaperError;
use crate::question::Question;
use crate::tags::merge_tags;

/// Empty strings count as "not set", matching how the form submits them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperFilter {
    pub grade: Option<String>,
    pub question_type: Option<String>,
    pub difficulty: Option<u8>,
    /// A question matches when it carries any of these.
    pub tags: Vec<String>,
}

fn set(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

impl PaperFilter {
    pub fn matches(&self, q: &Question) -> bool {
        if set(&self.grade).is_some_and(|g| g != q.grade) {
            return false;
        }
        if set(&self.question_type).is_some_and(|t| t != q.question_type) {
            return false;
        }
        if self.difficulty.is_some_and(|d| d != q.difficulty) {
            return false;
        }
        self.tags.is_empty() || self.tags.iter().any(|t| q.custom_tags.contains(t))
    }
}

pub fn filter_questions<'a>(questions: &'a [Question], filter: &PaperFilter) -> Vec<&'a Question> {
    questions.iter().filter(|q| filter.matches(q)).collect()
}

/// Every custom tag in use, in first-seen order.
pub fn available_tags(questions: &[Question]) -> Vec<String> {
    questions
        .iter()
        .fold(Vec::new(), |acc, q| merge_tags(&acc, q.custom_tags.iter().cloned()))
}

/// Draws up to `count` distinct questions uniformly from those matching
/// `filter` and returns their ids.
pub fn assemble_random<R: Rng + ?Sized>(
    questions: &[Question],
    filter: &PaperFilter,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, PaperError> {
    if count == 0 {
        return Err(PaperError::InvalidCount);
    }
    let mut pool = filter_questions(questions, filter);
    if pool.is_empty() {
        return Err(PaperError::NoMatchingQuestions);
    }
    pool.shuffle(rng);
    Ok(pool.into_iter().take(count).map(|q| q.id.clone()).collect())
}

/// Looks up `ids` in order.
pub fn assemble_manual<'a>(
    questions: &'a [Question],
    ids: &[String],
) -> Result<Vec<&'a Question>, PaperError> {
    ids.iter()
        .map(|id| {
            questions
                .iter()
                .find(|q| &q.id == id)
                .ok_or_else(|| PaperError::UnknownQuestion(id.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn q(id: &str, grade: &str, kind: &str, difficulty: u8, tags: &[&str]) -> Question {
        Question {
            id: id.to_string(),
            grade: grade.to_string(),
            question_type: kind.to_string(),
            difficulty,
            custom_tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Question::default()
        }
    }

    fn bank() -> Vec<Question> {
        vec![
            q("1", "高一", "选择题", 1, &["集合"]),
            q("2", "高一", "填空题", 2, &["函数", "集合"]),
            q("3", "高二", "选择题", 3, &["导数"]),
            q("4", "高一", "选择题", 2, &["函数"]),
        ]
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert_eq!(filter_questions(&bank(), &PaperFilter::default()).len(), 4);
    }

    #[test]
    fn empty_strings_are_unset() {
        let f = PaperFilter {
            grade: Some(String::new()),
            ..PaperFilter::default()
        };
        assert_eq!(filter_questions(&bank(), &f).len(), 4);
    }

    #[test]
    fn criteria_combine() {
        let f = PaperFilter {
            grade: Some("高一".to_string()),
            question_type: Some("选择题".to_string()),
            difficulty: None,
            tags: vec!["函数".to_string(), "导数".to_string()],
        };
        let binding = bank();
        let ids: Vec<&str> = filter_questions(&binding, &f).iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["4"]);
    }

    #[test]
    fn tags_in_first_seen_order() {
        assert_eq!(available_tags(&bank()), vec!["集合", "函数", "导数"]);
    }

    #[test]
    fn random_draw_is_distinct_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let ids = assemble_random(&bank(), &PaperFilter::default(), 3, &mut rng).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);

        let all = assemble_random(&bank(), &PaperFilter::default(), 10, &mut rng).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn random_draw_errors() {
        let mut rng = StdRng::seed_from_u64(1);
        let none = PaperFilter {
            grade: Some("初三".to_string()),
            ..PaperFilter::default()
        };
        assert_eq!(
            assemble_random(&bank(), &none, 3, &mut rng),
            Err(PaperError::NoMatchingQuestions)
        );
        assert_eq!(
            assemble_random(&bank(), &PaperFilter::default(), 0, &mut rng),
            Err(PaperError::InvalidCount)
        );
    }

    #[test]
    fn manual_keeps_order_and_rejects_unknown() {
        let qs = bank();
        let picked = assemble_manual(&qs, &["3".to_string(), "1".to_string()]).unwrap();
        assert_eq!(picked[0].id, "3");
        assert_eq!(picked[1].id, "1");
        assert_eq!(
            assemble_manual(&qs, &["9".to_string()]).map(|v| v.len()),
            Err(PaperError::UnknownQuestion("9".to_string()))
        );
    }
}
