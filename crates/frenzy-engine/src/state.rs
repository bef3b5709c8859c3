use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use frenzy_core::config::{GameConfig, GameMode};
use frenzy_core::player::{MAX_PLAYERS, Player, PlayerId};
use frenzy_core::powerup::{PowerupInventory, PowerupKind};
use frenzy_core::question::{Category, Difficulty, Question};

use crate::scoring;

/// Session lifecycle. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Paused,
    Finished,
}

/// Running statistics, updated as answers resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Running mean over `total_questions` samples.
    pub average_response_time_ms: f64,
    pub fastest_answer_ms: Option<u64>,
    pub longest_streak: u32,
}

/// Pure data for one game session, owned exclusively by the engine.
///
/// `scores`, `streaks`, and `powerups` always hold exactly the ids of the
/// current players. Tie-breaks and timeout attribution follow the
/// insertion order of `players`, never map iteration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub categories: Vec<Category>,
    pub status: GameStatus,
    /// 1-based round counter; never exceeds `max_rounds + 1`.
    pub round: u32,
    pub max_rounds: u32,
    pub time_limit_secs: u32,
    pub scores: HashMap<PlayerId, i32>,
    pub streaks: HashMap<PlayerId, u32>,
    pub powerups: HashMap<PlayerId, PowerupInventory>,
    pub current_question: Option<Question>,
    pub question_start_time: Option<u64>,
    pub game_start_time: Option<u64>,
    pub game_end_time: Option<u64>,
    pub winner: Option<Player>,
    pub stats: GameStats,
}

impl Default for GameState {
    fn default() -> Self {
        let mut state = Self {
            players: Vec::new(),
            mode: GameMode::Classic,
            difficulty: Difficulty::Medium,
            categories: Category::ALL.to_vec(),
            status: GameStatus::Waiting,
            round: 1,
            max_rounds: 10,
            time_limit_secs: 30,
            scores: HashMap::new(),
            streaks: HashMap::new(),
            powerups: HashMap::new(),
            current_question: None,
            question_start_time: None,
            game_start_time: None,
            game_end_time: None,
            winner: None,
            stats: GameStats::default(),
        };
        state.reset(&GameConfig::default());
        state
    }
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let mut state = Self::default();
        state.reset(config);
        state
    }

    /// Reinitialize every field for a fresh session under `config`.
    /// Players are dropped; the lobby re-adds them.
    pub fn reset(&mut self, config: &GameConfig) {
        self.players.clear();
        self.mode = config.mode;
        self.difficulty = config.difficulty;
        self.categories = config.categories.clone();
        self.status = GameStatus::Waiting;
        self.round = 1;
        self.max_rounds = config.max_rounds;
        self.time_limit_secs = config.time_limit_secs;
        self.scores.clear();
        self.streaks.clear();
        self.powerups.clear();
        self.current_question = None;
        self.question_start_time = None;
        self.game_start_time = None;
        self.game_end_time = None;
        self.winner = None;
        self.stats = GameStats::default();
    }

    /// Seat a player. False once the table is full.
    pub fn add_player(&mut self, player: Player) -> bool {
        if self.players.len() >= MAX_PLAYERS {
            return false;
        }
        self.scores.insert(player.id.clone(), 0);
        self.streaks.insert(player.id.clone(), 0);
        self.powerups
            .insert(player.id.clone(), PowerupInventory::default());
        self.players.push(player);
        true
    }

    pub fn remove_player(&mut self, player_id: &str) {
        self.players.retain(|p| p.id != player_id);
        self.scores.remove(player_id);
        self.streaks.remove(player_id);
        self.powerups.remove(player_id);
    }

    pub fn update_score(&mut self, player_id: &str, points: i32) {
        if let Some(score) = self.scores.get_mut(player_id) {
            *score += points;
        }
    }

    /// Extend or break a streak, tracking the longest seen.
    pub fn update_streak(&mut self, player_id: &str, correct: bool) {
        let Some(streak) = self.streaks.get_mut(player_id) else {
            return;
        };
        if correct {
            *streak += 1;
            if *streak > self.stats.longest_streak {
                self.stats.longest_streak = *streak;
            }
        } else {
            *streak = 0;
        }
    }

    /// Consume one powerup charge. False when spent or unknown player.
    pub fn use_powerup(&mut self, player_id: &str, kind: PowerupKind) -> bool {
        match self.powerups.get_mut(player_id) {
            Some(inventory) => inventory.take(kind),
            None => false,
        }
    }

    /// Fold one response time into the fastest/average statistics.
    pub fn record_response(&mut self, response_time_ms: u64) {
        if self
            .stats
            .fastest_answer_ms
            .is_none_or(|fastest| response_time_ms < fastest)
        {
            self.stats.fastest_answer_ms = Some(response_time_ms);
        }
        let n = f64::from(self.stats.total_questions.max(1));
        self.stats.average_response_time_ms =
            (self.stats.average_response_time_ms * (n - 1.0) + response_time_ms as f64) / n;
    }

    /// Remaining survival-mode lives: wrong answers are charged against a
    /// shared pool of three.
    pub fn lives(&self) -> u32 {
        scoring::SURVIVAL_LIVES.saturating_sub(self.stats.wrong_answers)
    }

    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        match self.game_start_time {
            Some(start) => now_ms.saturating_sub(start) / 1000,
            None => 0,
        }
    }

    /// The player with the strictly highest score. Ties go to the player
    /// added first.
    pub fn leader(&self) -> Option<&Player> {
        let mut best: Option<(&Player, i32)> = None;
        for player in &self.players {
            let score = self.scores.get(&player.id).copied().unwrap_or(0);
            match best {
                Some((_, top)) if score <= top => {},
                _ => best = Some((player, score)),
            }
        }
        best.map(|(player, _)| player)
    }

    /// Whether the current mode's end condition holds.
    pub fn check_win_condition(&self, now_ms: u64) -> bool {
        match self.mode {
            GameMode::Classic => self
                .scores
                .values()
                .any(|&score| score >= scoring::CLASSIC_TARGET_SCORE),
            GameMode::Speed => self.elapsed_secs(now_ms) >= scoring::SPEED_GAME_DURATION_SECS,
            GameMode::Survival => !self.players.is_empty() && self.lives() == 0,
            GameMode::Tournament => self.round > self.max_rounds,
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Paused;
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) -> bool {
        if self.status == GameStatus::Paused {
            self.status = GameStatus::Playing;
            true
        } else {
            false
        }
    }
}
