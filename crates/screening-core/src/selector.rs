//! Stratified question selection.
//!
//! Draws a fixed number of questions from each difficulty stratum, merges
//! them, shuffles the merged order and shuffles every question's options.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, PresentedOption, PresentedQuestion, Question};

/// Default number of easy questions per set.
pub const DEFAULT_EASY: usize = 4;
/// Default number of medium questions per set.
pub const DEFAULT_MEDIUM: usize = 3;
/// Default number of hard questions per set.
pub const DEFAULT_HARD: usize = 3;

/// How many questions to draw from each difficulty stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratumTargets {
    #[serde(default = "default_easy")]
    pub easy: usize,
    #[serde(default = "default_medium")]
    pub medium: usize,
    #[serde(default = "default_hard")]
    pub hard: usize,
}

fn default_easy() -> usize {
    DEFAULT_EASY
}
fn default_medium() -> usize {
    DEFAULT_MEDIUM
}
fn default_hard() -> usize {
    DEFAULT_HARD
}

impl Default for StratumTargets {
    fn default() -> Self {
        Self {
            easy: DEFAULT_EASY,
            medium: DEFAULT_MEDIUM,
            hard: DEFAULT_HARD,
        }
    }
}

impl StratumTargets {
    /// Target size for one stratum.
    pub fn target(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    /// Size of a set drawn from a pool with enough supply.
    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }
}

/// Build a randomized, stratified question set from `pool`.
///
/// A stratum with fewer items than its target contributes all of them, so
/// the set shrinks instead of failing. Duplicate ids in the pool keep their
/// first occurrence. An empty pool yields an empty set.
pub fn select_questions<R: Rng + ?Sized>(
    pool: &[Question],
    targets: &StratumTargets,
    rng: &mut R,
) -> Vec<PresentedQuestion> {
    let mut seen = HashSet::new();
    let unique: Vec<&Question> = pool.iter().filter(|q| seen.insert(q.id)).collect();

    let mut selected: Vec<&Question> = Vec::with_capacity(targets.total());
    for difficulty in Difficulty::ALL {
        let bucket: Vec<&Question> = unique
            .iter()
            .copied()
            .filter(|q| q.difficulty == difficulty)
            .collect();
        let target = targets.target(difficulty);

        if bucket.len() >= target {
            selected.extend(bucket.choose_multiple(rng, target).copied());
        } else {
            tracing::debug!(
                "stratum {difficulty} short: {} available, {target} wanted",
                bucket.len()
            );
            selected.extend(bucket);
        }
    }

    // Position must not leak difficulty.
    selected.shuffle(rng);

    selected.into_iter().map(|q| present(q, rng)).collect()
}

/// Strip the answer and shuffle the option order for display.
pub fn present<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> PresentedQuestion {
    let mut options: Vec<PresentedOption> = question
        .options
        .iter()
        .map(|(label, text)| PresentedOption {
            label: label.clone(),
            text: text.clone(),
        })
        .collect();
    options.shuffle(rng);

    PresentedQuestion {
        id: question.id,
        category: question.category,
        difficulty: question.difficulty,
        prompt: question.prompt.clone(),
        options,
    }
}
