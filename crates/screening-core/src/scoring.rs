//! Submission scoring and status classification.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerKey, AssessmentResult, Category, Difficulty, QuestionId, Status, Submission};

/// Scores at or above this pass.
pub const DEFAULT_PASS_AT: u8 = 70;
/// Scores at or below this are rejected.
pub const DEFAULT_REJECT_AT: u8 = 40;

/// Score thresholds for status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    #[serde(default = "default_pass_at")]
    pub pass_at: u8,
    #[serde(default = "default_reject_at")]
    pub reject_at: u8,
}

fn default_pass_at() -> u8 {
    DEFAULT_PASS_AT
}
fn default_reject_at() -> u8 {
    DEFAULT_REJECT_AT
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            pass_at: DEFAULT_PASS_AT,
            reject_at: DEFAULT_REJECT_AT,
        }
    }
}

impl ScoreThresholds {
    /// Classify a percentage score. Pass takes precedence if the thresholds
    /// overlap.
    pub fn classify(&self, score: u8) -> Status {
        if score >= self.pass_at {
            Status::Pass
        } else if score <= self.reject_at {
            Status::Reject
        } else {
            Status::Review
        }
    }
}

/// Correctness tallies for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub wrong: u32,
    pub category_breakdown: BTreeMap<Category, u32>,
    pub difficulty_breakdown: BTreeMap<Difficulty, u32>,
}

impl Tally {
    /// `floor(100 * correct / (correct + wrong))`, or 0 when nothing was
    /// scored.
    pub fn percentage(&self) -> u8 {
        let answered = u64::from(self.correct) + u64::from(self.wrong);
        if answered == 0 {
            return 0;
        }
        (u64::from(self.correct) * 100 / answered) as u8
    }
}

/// Parse an answer key as a question id. Only the canonical decimal
/// spelling is accepted, so `"01"`, `" 1"` and `"+1"` never alias `"1"`.
pub fn canonical_id(raw: &str) -> Option<QuestionId> {
    let id: QuestionId = raw.parse().ok()?;
    (id.to_string() == raw).then_some(id)
}

/// The question ids a submission refers to. Non-canonical ids are skipped.
pub fn submitted_ids(submission: &Submission) -> HashSet<QuestionId> {
    submission
        .answers
        .keys()
        .filter_map(|raw| canonical_id(raw))
        .collect()
}

/// Compare each answer against the key.
///
/// Answers whose id is non-canonical or missing from the key are ignored,
/// so each question counts at most once. Label comparison is exact and
/// case-sensitive.
pub fn tally(submission: &Submission, key: &AnswerKey) -> Tally {
    let mut tally = Tally::default();

    for (raw_id, choice) in &submission.answers {
        let Some(entry) = canonical_id(raw_id).and_then(|id| key.get(&id)) else {
            tracing::debug!("ignoring answer for unknown question id {raw_id:?}");
            continue;
        };

        let is_correct = *choice == entry.correct_label;
        if is_correct {
            tally.correct += 1;
        } else {
            tally.wrong += 1;
        }
        // Buckets exist for every answered category, even with zero correct.
        *tally.category_breakdown.entry(entry.category).or_insert(0) += u32::from(is_correct);
        *tally.difficulty_breakdown.entry(entry.difficulty).or_insert(0) += u32::from(is_correct);
    }

    tally
}

/// Score a submission into a new immutable result.
pub fn score_submission(
    submission: &Submission,
    key: &AnswerKey,
    thresholds: &ScoreThresholds,
    now: DateTime<Utc>,
) -> AssessmentResult {
    let tally = tally(submission, key);
    let score = tally.percentage();

    AssessmentResult {
        id: Uuid::new_v4(),
        email: submission.email.clone(),
        score,
        correct: tally.correct,
        wrong: tally.wrong,
        category_breakdown: tally.category_breakdown,
        difficulty_breakdown: tally.difficulty_breakdown,
        duration: submission.duration,
        status: thresholds.classify(score),
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerKeyEntry;

    fn entry(category: Category, difficulty: Difficulty, correct: &str) -> AnswerKeyEntry {
        AnswerKeyEntry {
            category,
            difficulty,
            correct_label: correct.into(),
        }
    }

    fn submission(answers: &[(&str, &str)]) -> Submission {
        Submission {
            email: "cand@example.com".into(),
            answers: answers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            duration: 1200,
        }
    }

    #[test]
    fn one_right_one_wrong_is_review() {
        let mut key = AnswerKey::new();
        key.insert(1, entry(Category::Technical, Difficulty::Easy, "A"));
        key.insert(2, entry(Category::Aptitude, Difficulty::Hard, "C"));

        let result = score_submission(
            &submission(&[("1", "A"), ("2", "B")]),
            &key,
            &ScoreThresholds::default(),
            Utc::now(),
        );
        assert_eq!(result.correct, 1);
        assert_eq!(result.wrong, 1);
        assert_eq!(result.score, 50);
        assert_eq!(result.status, Status::Review);
        assert_eq!(result.category_breakdown[&Category::Technical], 1);
        assert_eq!(result.category_breakdown[&Category::Aptitude], 0);
        assert_eq!(result.difficulty_breakdown[&Difficulty::Hard], 0);
        assert_eq!(result.duration, 1200);
    }

    #[test]
    fn empty_submission_is_zero_reject() {
        let result = score_submission(
            &submission(&[]),
            &AnswerKey::new(),
            &ScoreThresholds::default(),
            Utc::now(),
        );
        assert_eq!(result.score, 0);
        assert_eq!(result.status, Status::Reject);
        assert!(result.category_breakdown.is_empty());
    }

    #[test]
    fn all_correct_is_pass() {
        let mut key = AnswerKey::new();
        let mut answers = Vec::new();
        let ids: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
        for (i, id) in ids.iter().enumerate() {
            key.insert(
                i as u32 + 1,
                entry(Category::Reasoning, Difficulty::ALL[i % 3], "D"),
            );
            answers.push((id.as_str(), "D"));
        }
        let result = score_submission(
            &submission(&answers),
            &key,
            &ScoreThresholds::default(),
            Utc::now(),
        );
        assert_eq!(result.score, 100);
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.category_breakdown[&Category::Reasoning], 10);
        assert_eq!(result.difficulty_breakdown.values().sum::<u32>(), 10);
    }

    #[test]
    fn unknown_and_malformed_ids_are_ignored() {
        let mut key = AnswerKey::new();
        key.insert(1, entry(Category::Technical, Difficulty::Easy, "A"));
        let t = tally(&submission(&[("1", "A"), ("99", "A"), ("abc", "B"), ("", "C")]), &key);
        assert_eq!(t.correct, 1);
        assert_eq!(t.wrong, 0);
        assert_eq!(t.percentage(), 100);
    }

    #[test]
    fn labels_are_case_sensitive() {
        let mut key = AnswerKey::new();
        key.insert(1, entry(Category::Technical, Difficulty::Easy, "A"));
        let t = tally(&submission(&[("1", "a")]), &key);
        assert_eq!(t.correct, 0);
        assert_eq!(t.wrong, 1);
    }

    #[test]
    fn percentage_floors() {
        let t = Tally {
            correct: 2,
            wrong: 1,
            ..Default::default()
        };
        assert_eq!(t.percentage(), 66);
        let t = Tally {
            correct: 699,
            wrong: 301,
            ..Default::default()
        };
        assert_eq!(t.percentage(), 69);
        assert_eq!(Tally::default().percentage(), 0);
    }

    #[test]
    fn classification_boundaries() {
        let th = ScoreThresholds::default();
        assert_eq!(th.classify(100), Status::Pass);
        assert_eq!(th.classify(70), Status::Pass);
        assert_eq!(th.classify(69), Status::Review);
        assert_eq!(th.classify(41), Status::Review);
        assert_eq!(th.classify(40), Status::Reject);
        assert_eq!(th.classify(0), Status::Reject);
    }

    #[test]
    fn submitted_ids_skip_garbage() {
        let ids = submitted_ids(&submission(&[("1", "A"), ("2", "B"), (" 3 ", "B"), ("x", "C")]));
        assert_eq!(ids, HashSet::from([1, 2]));
    }

    #[test]
    fn aliased_ids_count_once() {
        let mut key = AnswerKey::new();
        key.insert(1, entry(Category::Technical, Difficulty::Easy, "A"));
        key.insert(2, entry(Category::Aptitude, Difficulty::Hard, "C"));

        let padded = submission(&[
            ("1", "A"),
            ("01", "A"),
            ("001", "A"),
            (" 1", "A"),
            ("+1", "A"),
            ("2", "B"),
        ]);
        let result = score_submission(&padded, &key, &ScoreThresholds::default(), Utc::now());
        assert_eq!(result.correct, 1);
        assert_eq!(result.wrong, 1);
        assert_eq!(result.score, 50);
        assert_eq!(result.status, Status::Review);
        assert_eq!(result.category_breakdown[&Category::Technical], 1);
        assert_eq!(submitted_ids(&padded), HashSet::from([1, 2]));
    }

    #[test]
    fn canonical_ids_only() {
        assert_eq!(canonical_id("7"), Some(7));
        assert_eq!(canonical_id("0"), Some(0));
        assert_eq!(canonical_id("07"), None);
        assert_eq!(canonical_id("+7"), None);
        assert_eq!(canonical_id("7 "), None);
        assert_eq!(canonical_id("-7"), None);
        assert_eq!(canonical_id(""), None);
    }
}
