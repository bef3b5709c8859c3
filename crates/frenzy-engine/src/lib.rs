//! Game engine for Flashfrenzy: state, scoring, timers, events, and
//! history for head-to-head trivia matches.

pub mod engine;
pub mod history;
pub mod scoring;
pub mod session;
pub mod state;

pub use engine::{EngineError, GameEngine};
pub use history::MemoryHistory;
pub use session::{SessionBroadcast, SessionCommand, TICK_INTERVAL, spawn_session};
pub use state::{GameState, GameStatus};
