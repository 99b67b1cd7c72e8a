//! Core data model types for screening.
//!
//! These are the fundamental types the assessment engine passes between the
//! store, the selector, the scorer and the presentation boundary.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a question in the catalog.
pub type QuestionId = u32;

/// A single multiple-choice quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the catalog.
    pub id: QuestionId,
    /// Topic the question belongs to.
    pub category: Category,
    /// Difficulty stratum used for sampling.
    pub difficulty: Difficulty,
    /// The question text shown to the candidate.
    pub prompt: String,
    /// Option label → option text. Ordering carries no meaning.
    pub options: BTreeMap<String, String>,
    /// Label of the correct option.
    pub correct_label: String,
}

impl Question {
    /// The answer-key view of this question.
    pub fn answer_key_entry(&self) -> AnswerKeyEntry {
        AnswerKeyEntry {
            category: self.category,
            difficulty: self.difficulty,
            correct_label: self.correct_label.clone(),
        }
    }
}

/// A named catalog of questions, as loaded from a bank file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this bank.
    #[serde(default)]
    pub description: String,
    /// The questions in this bank.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Question topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Aptitude,
    Reasoning,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Technical => write!(f, "technical"),
            Category::Aptitude => write!(f, "aptitude"),
            Category::Reasoning => write!(f, "reasoning"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(Category::Technical),
            "aptitude" => Ok(Category::Aptitude),
            "reasoning" => Ok(Category::Reasoning),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Difficulty stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Outcome classification of a scored attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Review,
    Reject,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => write!(f, "pass"),
            Status::Review => write!(f, "review"),
            Status::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pass" => Ok(Status::Pass),
            "review" => Ok(Status::Review),
            "reject" => Ok(Status::Reject),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// What the scorer needs to know about one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    pub category: Category,
    pub difficulty: Difficulty,
    pub correct_label: String,
}

/// Answer key for a set of questions.
pub type AnswerKey = HashMap<QuestionId, AnswerKeyEntry>;

/// One option as displayed to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedOption {
    pub label: String,
    pub text: String,
}

/// A question as exposed across the presentation boundary.
///
/// Deliberately has no correct-label field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedQuestion {
    pub id: QuestionId,
    pub category: Category,
    pub difficulty: Difficulty,
    pub prompt: String,
    /// Options in display order.
    pub options: Vec<PresentedOption>,
}

/// Where the questions or a score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolSource {
    /// The persistence store.
    Store,
    /// The synthetic fallback path.
    Fallback,
}

/// A randomized question set issued to one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<PresentedQuestion>,
    pub source: PoolSource,
}

/// A candidate's answers for one attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    /// Candidate email, used as the external key.
    #[serde(default)]
    pub email: String,
    /// Question id (as sent by the client) → chosen option label.
    /// Required; an explicit empty object is a valid submission.
    pub answers: BTreeMap<String, String>,
    /// Wall-clock duration of the attempt in seconds.
    pub duration: u32,
}

/// The persisted outcome of a scored attempt. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub id: Uuid,
    pub email: String,
    /// Integer percentage, 0–100.
    pub score: u8,
    pub correct: u32,
    pub wrong: u32,
    /// Category → correct answers in that category.
    pub category_breakdown: BTreeMap<Category, u32>,
    /// Difficulty → correct answers at that difficulty.
    pub difficulty_breakdown: BTreeMap<Difficulty, u32>,
    /// Attempt duration in seconds.
    pub duration: u32,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

/// A behavioral signal reported by the client during a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiCheatEvent {
    pub id: Uuid,
    pub email: String,
    /// Free-form tag such as "blur", "copy" or "fullscreen-exit".
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
}

/// What the notification collaborator receives after a result is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultNotice {
    pub email: String,
    pub status: Status,
    pub score: u8,
    /// When a rejected candidate may apply again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_at: Option<DateTime<Utc>>,
}

impl ResultNotice {
    /// Build the notice for a stored result. Rejects carry the end of
    /// their reapply lock.
    pub fn for_result(result: &AssessmentResult, cooldown: chrono::Duration) -> Self {
        Self {
            email: result.email.clone(),
            status: result.status,
            score: result.score,
            retry_at: (result.status == Status::Reject).then(|| result.created_at + cooldown),
        }
    }
}
