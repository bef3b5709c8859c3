use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Question subject areas available in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Science,
    History,
    Geography,
    Literature,
    Math,
    Sports,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Science,
        Category::History,
        Category::Geography,
        Category::Literature,
        Category::Math,
        Category::Sports,
    ];
}

/// Question difficulty tier. Carries the scoring multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Score multiplier applied to correct answers at this tier.
    pub fn multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }

    /// The two tiers used to backfill a short deck.
    pub fn others(self) -> [Difficulty; 2] {
        match self {
            Difficulty::Easy => [Difficulty::Medium, Difficulty::Hard],
            Difficulty::Medium => [Difficulty::Easy, Difficulty::Hard],
            Difficulty::Hard => [Difficulty::Easy, Difficulty::Medium],
        }
    }
}

/// A drawn question. The id is generated fresh at draw time, so the same
/// bank entry drawn twice carries two different ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct: usize,
    pub explanation: String,
    pub category: Category,
    pub difficulty: Difficulty,
}

impl Question {
    /// Indices of the incorrect options.
    pub fn incorrect_indices(&self) -> Vec<usize> {
        (0..self.options.len())
            .filter(|&i| i != self.correct)
            .collect()
    }
}

/// Selection criteria for building a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckCriteria {
    pub categories: Vec<Category>,
    pub difficulty: Difficulty,
    pub count: usize,
}

/// Sequential question supply consumed by the game engine.
///
/// `check_answer` with no current question must return false without
/// side effects; `generate_deck` may return fewer than `count` questions
/// when the pool is short, never an error.
pub trait QuestionProvider: Send {
    fn generate_deck(&mut self, criteria: &DeckCriteria) -> Vec<Question>;
    /// The question at the internal cursor, or None past the end.
    fn current(&self) -> Option<&Question>;
    /// Move the cursor one question forward.
    fn advance(&mut self);
    /// Compare `answer_index` against the current question's correct index
    /// and mark the question consumed.
    fn check_answer(&mut self, answer_index: usize) -> bool;
    /// Rewind the cursor to the start of the deck.
    fn reset(&mut self);
}
