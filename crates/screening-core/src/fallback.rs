//! Degraded path used when the store cannot serve a request.
//!
//! A `FallbackProvider` supplies a question pool and a mock score so that a
//! store outage never turns into a user-visible error. Everything it
//! produces is labeled as [`PoolSource::Fallback`](crate::model::PoolSource)
//! by the engine.

use std::path::Path;

use anyhow::Result;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::model::Category::{self, Aptitude, Reasoning, Technical};
use crate::model::Difficulty::{self, Easy, Hard, Medium};
use crate::model::{Question, QuestionId};
use crate::parser::parse_bank;

/// Lower bound of the default mock score range.
pub const DEFAULT_MOCK_SCORE_MIN: u8 = 45;
/// Upper bound of the default mock score range.
pub const DEFAULT_MOCK_SCORE_MAX: u8 = 85;

/// Inclusive range a mock score is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockScoreRange {
    #[serde(default = "default_min")]
    pub min: u8,
    #[serde(default = "default_max")]
    pub max: u8,
}

fn default_min() -> u8 {
    DEFAULT_MOCK_SCORE_MIN
}
fn default_max() -> u8 {
    DEFAULT_MOCK_SCORE_MAX
}

impl Default for MockScoreRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MOCK_SCORE_MIN,
            max: DEFAULT_MOCK_SCORE_MAX,
        }
    }
}

impl MockScoreRange {
    /// Draw a score, clamped to 0–100. Reversed bounds are swapped.
    pub fn draw(&self, rng: &mut dyn RngCore) -> u8 {
        let lo = self.min.min(self.max).min(100);
        let hi = self.min.max(self.max).min(100);
        rng.gen_range(lo..=hi)
    }
}

/// Strategy for the degraded path.
pub trait FallbackProvider: Send + Sync {
    /// Human-readable name (e.g. "synthetic").
    fn name(&self) -> &str;

    /// The pool to sample from when the store has no questions to give.
    fn questions(&self) -> Vec<Question>;

    /// A stand-in score when answers cannot be checked against the store.
    fn mock_score(&self, rng: &mut dyn RngCore) -> u8;
}

// ---------------------------------------------------------------------------
// Built-in synthetic pool
// ---------------------------------------------------------------------------

type Row = (
    QuestionId,
    Category,
    Difficulty,
    &'static str,
    [&'static str; 4],
    &'static str,
);

#[rustfmt::skip]
const SYNTHETIC_POOL: &[Row] = &[
    (9001, Technical, Medium, "What is the difference between a list and a tuple in Python?",
        ["Lists are mutable, tuples are immutable", "Tuples are mutable, lists are immutable", "There is no difference", "Tuples can only hold numbers"], "A"),
    (9002, Technical, Easy, "Which of the following creates an empty dictionary in Python?",
        ["{}", "[]", "()", "dict[]"], "A"),
    (9003, Technical, Hard, "What does print(2 ** 3 ** 2) output in Python?",
        ["64", "512", "256", "9"], "B"),
    (9004, Technical, Medium, "Which keyword handles exceptions raised inside a Python try block?",
        ["catch", "rescue", "except", "handle"], "C"),
    (9005, Technical, Hard, "Which mechanism does CPython primarily use to free unreachable objects?",
        ["Manual free()", "Reference counting plus a cycle collector", "Only a mark-and-sweep collector", "Objects are never freed"], "B"),
    (9006, Technical, Medium, "How do let and const differ from var in JavaScript?",
        ["let and const are block-scoped, var is function-scoped", "There is no difference", "var is block-scoped", "let is global"], "A"),
    (9007, Technical, Easy, "Which JavaScript operator checks both value and type equality?",
        ["==", "=", "===", "!="], "C"),
    (9008, Technical, Medium, "In React, what is the useEffect hook for?",
        ["Managing component state", "Running side effects after render", "Declaring components", "Styling elements"], "B"),
    (9009, Technical, Hard, "Why should React state not be mutated directly?",
        ["It throws a syntax error", "React may not detect the change and skip re-rendering", "It deletes the component", "It is slower to read"], "B"),
    (9010, Technical, Easy, "Which HTTP method is conventionally used to fetch a resource?",
        ["GET", "POST", "DELETE", "PATCH"], "A"),
    (9011, Technical, Medium, "What does SQL's GROUP BY clause do?",
        ["Sorts rows", "Aggregates rows sharing the same values", "Joins two tables", "Deletes duplicates"], "B"),
    (9012, Technical, Hard, "What is the average time complexity of lookup in a hash map?",
        ["O(1)", "O(log n)", "O(n)", "O(n log n)"], "A"),
    (9013, Aptitude, Medium, "A train travels 60 km in 45 minutes. What is its speed in km/hr?",
        ["60", "70", "80", "90"], "C"),
    (9014, Aptitude, Hard, "5 pens and 3 notebooks cost $47; 2 pens and 2 notebooks cost $26. What does one pen cost?",
        ["$3", "$4", "$5", "$6"], "B"),
    (9015, Aptitude, Medium, "$10,000 is invested at 10% simple interest for 2 years. What is the total amount?",
        ["$12,000", "$11,000", "$10,200", "$12,500"], "A"),
    (9016, Aptitude, Easy, "The ratio of boys to girls is 3:2 and there are 60 students. How many girls are there?",
        ["20", "24", "30", "36"], "B"),
    (9017, Aptitude, Medium, "What is the next number in the sequence 2, 6, 12, 20, 30, ...?",
        ["36", "40", "42", "56"], "C"),
    (9018, Aptitude, Easy, "What is 15% of 200?",
        ["15", "20", "30", "35"], "C"),
    (9019, Reasoning, Easy, "Find the odd one out: Apple, Mango, Banana, Potato.",
        ["Apple", "Mango", "Banana", "Potato"], "D"),
    (9020, Reasoning, Medium, "All roses are flowers and some flowers fade quickly. Which statement must be true?",
        ["All roses fade quickly", "Some roses may fade quickly", "No roses fade quickly", "All flowers are roses"], "B"),
    (9021, Reasoning, Medium, "Which word can be formed from the letters of 'LPAEN'?",
        ["PLANE", "PLANT", "PANTS", "LEAPT"], "A"),
    (9022, Reasoning, Hard, "If CAT = 24 and DOG = 26 (sum of letter positions), what is BAT?",
        ["21", "23", "24", "26"], "B"),
    (9023, Reasoning, Easy, "Which number completes the pattern 3, 6, 9, 12, ...?",
        ["13", "14", "15", "18"], "C"),
    (9024, Reasoning, Hard, "A is taller than B, C is shorter than B, D is taller than A. Who is the shortest?",
        ["A", "B", "C", "D"], "C"),
    (9025, Reasoning, Medium, "If today is Monday, what day is it 10 days from now?",
        ["Wednesday", "Thursday", "Friday", "Saturday"], "B"),
];

const LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// The built-in synthetic question pool.
pub fn synthetic_pool() -> Vec<Question> {
    SYNTHETIC_POOL
        .iter()
        .map(|(id, category, difficulty, prompt, options, correct)| Question {
            id: *id,
            category: *category,
            difficulty: *difficulty,
            prompt: (*prompt).to_string(),
            options: LABELS
                .iter()
                .zip(options.iter())
                .map(|(label, text)| (label.to_string(), text.to_string()))
                .collect(),
            correct_label: (*correct).to_string(),
        })
        .collect()
}

/// Fallback backed by the built-in synthetic pool.
pub struct SyntheticFallback {
    pool: Vec<Question>,
    scores: MockScoreRange,
}

impl SyntheticFallback {
    pub fn new(scores: MockScoreRange) -> Self {
        Self {
            pool: synthetic_pool(),
            scores,
        }
    }
}

impl Default for SyntheticFallback {
    fn default() -> Self {
        Self::new(MockScoreRange::default())
    }
}

impl FallbackProvider for SyntheticFallback {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn questions(&self) -> Vec<Question> {
        self.pool.clone()
    }

    fn mock_score(&self, rng: &mut dyn RngCore) -> u8 {
        self.scores.draw(rng)
    }
}

/// Fallback backed by a question bank file loaded at startup.
pub struct BankFallback {
    pool: Vec<Question>,
    scores: MockScoreRange,
}

impl BankFallback {
    pub fn from_questions(pool: Vec<Question>, scores: MockScoreRange) -> Self {
        Self { pool, scores }
    }

    /// Load the pool from a bank TOML file.
    pub fn load(path: &Path, scores: MockScoreRange) -> Result<Self> {
        let bank = parse_bank(path)?;
        tracing::info!(
            "fallback bank '{}' loaded with {} questions",
            bank.id,
            bank.questions.len()
        );
        Ok(Self::from_questions(bank.questions, scores))
    }
}

impl FallbackProvider for BankFallback {
    fn name(&self) -> &str {
        "bank"
    }

    fn questions(&self) -> Vec<Question> {
        self.pool.clone()
    }

    fn mock_score(&self, rng: &mut dyn RngCore) -> u8 {
        self.scores.draw(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::validate_bank;
    use crate::model::QuestionBank;
    use crate::selector::StratumTargets;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn synthetic_pool_is_well_formed() {
        let bank = QuestionBank {
            id: "synthetic".into(),
            name: "Synthetic".into(),
            description: String::new(),
            questions: synthetic_pool(),
        };
        assert_eq!(bank.questions.len(), 25);
        let warnings = validate_bank(&bank, &StratumTargets::default());
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn mock_score_within_range() {
        let fallback = SyntheticFallback::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let score = fallback.mock_score(&mut rng);
            assert!((45..=85).contains(&score));
        }
    }

    #[test]
    fn reversed_and_oversized_bounds() {
        let mut rng = StdRng::seed_from_u64(2);
        let range = MockScoreRange { min: 90, max: 80 };
        for _ in 0..50 {
            assert!((80..=90).contains(&range.draw(&mut rng)));
        }
        let range = MockScoreRange { min: 150, max: 200 };
        assert_eq!(range.draw(&mut rng), 100);
    }

    #[test]
    fn bank_fallback_loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fallback.toml");
        std::fs::write(
            &path,
            r#"
[bank]
id = "fb"
name = "Fallback"

[[questions]]
id = 1
category = "aptitude"
difficulty = "easy"
prompt = "2 + 2?"
correct = "B"

[questions.options]
A = "3"
B = "4"
"#,
        )
        .unwrap();

        let fallback = BankFallback::load(&path, MockScoreRange::default()).unwrap();
        assert_eq!(fallback.name(), "bank");
        assert_eq!(fallback.questions().len(), 1);
    }
}
