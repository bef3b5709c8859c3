use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GameMode;
use crate::player::{Player, PlayerId};
use crate::question::{Category, Difficulty};

/// Statistics assembled once a game finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalStats {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Running mean, rounded to whole milliseconds.
    pub average_response_time_ms: u64,
    pub fastest_answer_ms: Option<u64>,
    pub longest_streak: u32,
    pub game_duration_secs: u64,
    /// `correct / total` as a rounded percentage; 0 when no questions ran.
    pub accuracy: u32,
}

/// One finished game, as persisted to the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: Uuid,
    pub timestamp_ms: u64,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub categories: Vec<Category>,
    pub players: Vec<Player>,
    pub final_scores: HashMap<PlayerId, i32>,
    pub statistics: FinalStats,
    pub winner: Option<Player>,
}

/// Aggregate statistics for the local player across all recorded games.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    pub total_score: i64,
    pub best_streak: u32,
    pub total_questions: u32,
    pub total_correct: u32,
    /// Rounded percentage over all recorded questions.
    pub average_accuracy: u32,
}

/// Injected persistence boundary for game history and aggregate stats.
/// The engine only appends and reads; storage format is the store's concern.
pub trait HistoryStore: Send {
    fn append(&mut self, record: GameRecord);
    /// The most recent `limit` records, newest first.
    fn recent(&self, limit: usize) -> Vec<GameRecord>;
    fn read_stats(&self) -> PlayerStats;
    fn write_stats(&mut self, stats: PlayerStats);
}
