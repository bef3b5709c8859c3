use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use uuid::Uuid;

use frenzy_core::question::{DeckCriteria, Difficulty, Question, QuestionProvider};

use crate::bank::{BankEntry, QuestionBank};

/// Progress through the current deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckStats {
    pub deck_size: usize,
    /// 1-based position of the cursor, clamped to the deck size.
    pub current_question: usize,
    pub questions_answered: usize,
    pub questions_remaining: usize,
}

/// Bank-backed deck provider with a sequential cursor.
///
/// Each draw stamps a fresh id on the question, so repeated draws of the
/// same bank entry are distinct records.
pub struct DeckProvider {
    bank: QuestionBank,
    rng: StdRng,
    deck: Vec<Question>,
    cursor: usize,
    consumed: HashSet<Uuid>,
}

impl DeckProvider {
    pub fn new() -> Self {
        Self::with_bank(QuestionBank::builtin())
    }

    pub fn with_bank(bank: QuestionBank) -> Self {
        Self {
            bank,
            rng: StdRng::from_os_rng(),
            deck: Vec::new(),
            cursor: 0,
            consumed: HashSet::new(),
        }
    }

    /// Deterministic shuffling for tests and replayable sessions.
    pub fn with_seed(bank: QuestionBank, seed: u64) -> Self {
        Self {
            bank,
            rng: StdRng::seed_from_u64(seed),
            deck: Vec::new(),
            cursor: 0,
            consumed: HashSet::new(),
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn deck(&self) -> &[Question] {
        &self.deck
    }

    pub fn stats(&self) -> DeckStats {
        DeckStats {
            deck_size: self.deck.len(),
            current_question: (self.cursor + 1).min(self.deck.len()),
            questions_answered: self.consumed.len(),
            questions_remaining: self.deck.len().saturating_sub(self.cursor + 1),
        }
    }

    fn draw(&mut self, entry: &BankEntry) -> Question {
        Question {
            id: Uuid::new_v4(),
            prompt: entry.prompt.clone(),
            options: entry.options.clone(),
            correct: entry.correct,
            explanation: entry.explanation.clone(),
            category: entry.category,
            difficulty: entry.difficulty,
        }
    }
}

impl Default for DeckProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionProvider for DeckProvider {
    fn generate_deck(&mut self, criteria: &DeckCriteria) -> Vec<Question> {
        let mut pool: Vec<BankEntry> = self
            .bank
            .matching(&criteria.categories, criteria.difficulty)
            .into_iter()
            .cloned()
            .collect();

        // Short supply at the requested tier: pull in the other tiers for
        // the same categories before shuffling. Never an error.
        if pool.len() < criteria.count {
            for tier in criteria.difficulty.others() {
                pool.extend(
                    self.bank
                        .matching(&criteria.categories, tier)
                        .into_iter()
                        .cloned(),
                );
            }
        }

        let mut deck: Vec<Question> = pool.iter().map(|e| self.draw(e)).collect();
        deck.shuffle(&mut self.rng);
        deck.truncate(criteria.count);

        tracing::debug!(
            requested = criteria.count,
            dealt = deck.len(),
            difficulty = ?criteria.difficulty,
            "deck generated"
        );

        self.deck = deck.clone();
        self.cursor = 0;
        self.consumed.clear();
        deck
    }

    fn current(&self) -> Option<&Question> {
        self.deck.get(self.cursor)
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    fn check_answer(&mut self, answer_index: usize) -> bool {
        let Some(question) = self.deck.get(self.cursor) else {
            return false;
        };
        let is_correct = answer_index == question.correct;
        self.consumed.insert(question.id);
        is_correct
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.consumed.clear();
    }
}
