pub mod bus;
pub mod config;
pub mod events;
pub mod history;
pub mod player;
pub mod powerup;
pub mod question;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use uuid::Uuid;

    use crate::player::Player;
    use crate::question::{Category, DeckCriteria, Difficulty, Question, QuestionProvider};

    /// Create `n` test players named Player1..PlayerN; the first is the host.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                id: format!("p{}", i + 1),
                name: format!("Player{}", i + 1),
                is_host: i == 0,
            })
            .collect()
    }

    /// Create a test question whose correct option is at `correct`.
    pub fn make_question(correct: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            prompt: "What is 2 + 2?".to_string(),
            options: vec![
                "3".to_string(),
                "4".to_string(),
                "5".to_string(),
                "6".to_string(),
            ],
            correct,
            explanation: "2 + 2 = 4".to_string(),
            category: Category::Math,
            difficulty: Difficulty::Easy,
        }
    }

    /// Deterministic provider for engine tests: serves a fixed script of
    /// questions in order, ignoring the deck criteria beyond `count`.
    pub struct ScriptedProvider {
        script: Vec<Question>,
        deck: Vec<Question>,
        cursor: usize,
    }

    impl ScriptedProvider {
        pub fn new(script: Vec<Question>) -> Self {
            Self {
                script,
                deck: Vec::new(),
                cursor: 0,
            }
        }

        /// A script of `n` copies of the same question, correct index 1.
        pub fn repeating(n: usize) -> Self {
            Self::new((0..n).map(|_| make_question(1)).collect())
        }
    }

    impl QuestionProvider for ScriptedProvider {
        fn generate_deck(&mut self, criteria: &DeckCriteria) -> Vec<Question> {
            self.deck = self
                .script
                .iter()
                .take(criteria.count)
                .cloned()
                .collect();
            self.cursor = 0;
            self.deck.clone()
        }

        fn current(&self) -> Option<&Question> {
            self.deck.get(self.cursor)
        }

        fn advance(&mut self) {
            self.cursor += 1;
        }

        fn check_answer(&mut self, answer_index: usize) -> bool {
            match self.deck.get(self.cursor) {
                Some(q) => answer_index == q.correct,
                None => false,
            }
        }

        fn reset(&mut self) {
            self.cursor = 0;
        }
    }
}
