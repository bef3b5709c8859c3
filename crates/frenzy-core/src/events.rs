use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::history::FinalStats;
use crate::player::{Player, PlayerId};
use crate::powerup::{PowerupInventory, PowerupKind};
use crate::question::Question;

/// Discriminant for event subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    GameInitialized,
    PlayerAdded,
    PlayerRemoved,
    GameStarted,
    QuestionLoaded,
    AnswerSubmitted,
    TimerUpdate,
    TimeUp,
    HintShown,
    PlayerFrozen,
    PowerupUsed,
    GamePaused,
    GameResumed,
    GameEnded,
    GameReset,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GameInitialized => "gameInitialized",
            Self::PlayerAdded => "playerAdded",
            Self::PlayerRemoved => "playerRemoved",
            Self::GameStarted => "gameStarted",
            Self::QuestionLoaded => "questionLoaded",
            Self::AnswerSubmitted => "answerSubmitted",
            Self::TimerUpdate => "timerUpdate",
            Self::TimeUp => "timeUp",
            Self::HintShown => "hintShown",
            Self::PlayerFrozen => "playerFrozen",
            Self::PowerupUsed => "powerupUsed",
            Self::GamePaused => "gamePaused",
            Self::GameResumed => "gameResumed",
            Self::GameEnded => "gameEnded",
            Self::GameReset => "gameReset",
        };
        f.write_str(name)
    }
}

/// Lifecycle events published by the game engine. UI and network layers
/// subscribe to these; they never mutate engine state directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum EngineEvent {
    GameInitialized {
        config: GameConfig,
    },
    PlayerAdded {
        player: Player,
        players: Vec<Player>,
    },
    PlayerRemoved {
        player_id: PlayerId,
        players: Vec<Player>,
    },
    GameStarted {
        round: u32,
    },
    QuestionLoaded {
        question: Question,
        round: u32,
        time_limit_secs: u32,
    },
    AnswerSubmitted {
        player_id: PlayerId,
        answer_index: usize,
        is_correct: bool,
        response_time_ms: u64,
        explanation: String,
        scores: HashMap<PlayerId, i32>,
        streaks: HashMap<PlayerId, u32>,
    },
    TimerUpdate {
        time_left: u32,
        total: u32,
    },
    TimeUp {
        explanation: String,
        correct_answer: usize,
    },
    HintShown {
        remove_index: usize,
    },
    PlayerFrozen {
        player_id: PlayerId,
        duration_ms: u64,
    },
    PowerupUsed {
        player_id: PlayerId,
        kind: PowerupKind,
        remaining: PowerupInventory,
    },
    GamePaused,
    GameResumed,
    GameEnded {
        winner: Option<Player>,
        scores: HashMap<PlayerId, i32>,
        statistics: FinalStats,
    },
    GameReset,
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::GameInitialized { .. } => EventKind::GameInitialized,
            Self::PlayerAdded { .. } => EventKind::PlayerAdded,
            Self::PlayerRemoved { .. } => EventKind::PlayerRemoved,
            Self::GameStarted { .. } => EventKind::GameStarted,
            Self::QuestionLoaded { .. } => EventKind::QuestionLoaded,
            Self::AnswerSubmitted { .. } => EventKind::AnswerSubmitted,
            Self::TimerUpdate { .. } => EventKind::TimerUpdate,
            Self::TimeUp { .. } => EventKind::TimeUp,
            Self::HintShown { .. } => EventKind::HintShown,
            Self::PlayerFrozen { .. } => EventKind::PlayerFrozen,
            Self::PowerupUsed { .. } => EventKind::PowerupUsed,
            Self::GamePaused => EventKind::GamePaused,
            Self::GameResumed => EventKind::GameResumed,
            Self::GameEnded { .. } => EventKind::GameEnded,
            Self::GameReset => EventKind::GameReset,
        }
    }
}
