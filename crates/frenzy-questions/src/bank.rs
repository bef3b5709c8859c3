use std::collections::HashMap;

use serde::Deserialize;

use frenzy_core::question::{Category, Difficulty};

/// One question as stored in the bank, before being drawn.
/// Drawing attaches a fresh id (see `DeckProvider`).
#[derive(Debug, Clone, Deserialize)]
pub struct BankEntry {
    pub category: Category,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: usize,
    pub explanation: String,
}

/// The full question pool, parsed once from embedded TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionBank {
    questions: Vec<BankEntry>,
}

impl QuestionBank {
    /// The bank compiled into the binary.
    pub fn builtin() -> Self {
        toml::from_str(include_str!("../data/questions.toml"))
            .expect("embedded question bank must parse")
    }

    /// Parse a bank from TOML text (for externally supplied pools).
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn entries(&self) -> &[BankEntry] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Entries for the given categories at exactly the given difficulty.
    pub fn matching(&self, categories: &[Category], difficulty: Difficulty) -> Vec<&BankEntry> {
        self.questions
            .iter()
            .filter(|e| e.difficulty == difficulty && categories.contains(&e.category))
            .collect()
    }

    /// Question counts per difficulty tier for one category.
    pub fn difficulty_distribution(&self, category: Category) -> HashMap<Difficulty, usize> {
        let mut distribution: HashMap<Difficulty, usize> =
            Difficulty::ALL.iter().map(|&d| (d, 0)).collect();
        for entry in &self.questions {
            if entry.category == category {
                *distribution.entry(entry.difficulty).or_insert(0) += 1;
            }
        }
        distribution
    }

    /// Case-insensitive search over prompt, options, and explanation.
    pub fn search(&self, term: &str) -> Vec<&BankEntry> {
        let term = term.to_lowercase();
        self.questions
            .iter()
            .filter(|e| {
                e.prompt.to_lowercase().contains(&term)
                    || e.explanation.to_lowercase().contains(&term)
                    || e.options.iter().any(|o| o.to_lowercase().contains(&term))
            })
            .collect()
    }
}
