use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use frenzy_core::bus::{EventBus, Handler, SubscriptionId};
use frenzy_core::config::GameConfig;
use frenzy_core::events::{EngineEvent, EventKind};
use frenzy_core::history::{FinalStats, GameRecord, HistoryStore, PlayerStats};
use frenzy_core::player::Player;
use frenzy_core::powerup::PowerupKind;
use frenzy_core::question::{DeckCriteria, QuestionProvider};
use frenzy_core::time::{Clock, SystemClock};

use crate::scoring;
use crate::state::{GameState, GameStatus};

/// Structural misuse of the engine. Gameplay edge cases (spent powerups,
/// answers outside a round, full tables) are signaled by boolean returns
/// or silently ignored instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    NoPlayers,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPlayers => write!(f, "no players added to the game"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Per-question countdown, ticked at one-second granularity.
#[derive(Debug, Clone, Copy)]
struct Countdown {
    time_left: u32,
    next_tick_at: u64,
}

/// A deferred round advance. The token is captured at schedule time and
/// checked when the deadline fires, so an advance scheduled for a round
/// that has already moved on (e.g. via a skip powerup) is dropped.
#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    due_at: u64,
    token: u64,
}

/// Orchestrates one game session: state transitions, timers, scoring,
/// powerup effects, event emission, and history persistence.
///
/// The engine never blocks. Deadlines are held against the injected
/// clock and resolved by `tick()`, which the host calls periodically.
/// All collaborators are injected; there are no process-wide singletons.
pub struct GameEngine {
    state: GameState,
    provider: Box<dyn QuestionProvider>,
    history: Box<dyn HistoryStore>,
    bus: EventBus,
    clock: Box<dyn Clock>,
    config: GameConfig,
    rng: StdRng,
    countdown: Option<Countdown>,
    pending_advance: Option<PendingAdvance>,
    /// Bumped on every actual round advance; see `PendingAdvance`.
    round_token: u64,
    /// Remaining countdown seconds captured at pause time, when the
    /// preserve-time policy is enabled.
    frozen_time_left: Option<u32>,
}

impl GameEngine {
    pub fn new(provider: Box<dyn QuestionProvider>, history: Box<dyn HistoryStore>) -> Self {
        Self::with_clock(provider, history, Box::new(SystemClock))
    }

    pub fn with_clock(
        provider: Box<dyn QuestionProvider>,
        history: Box<dyn HistoryStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            state: GameState::default(),
            provider,
            history,
            bus: EventBus::new(),
            clock,
            config: GameConfig::default(),
            rng: StdRng::from_os_rng(),
            countdown: None,
            pending_advance: None,
            round_token: 0,
            frozen_time_left: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Serialized state for external relay (simulated network peers).
    pub fn snapshot(&self) -> Vec<u8> {
        rmp_serde::to_vec(&self.state).expect("game state serialization must succeed")
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Handler) -> SubscriptionId {
        self.bus.subscribe(kind, handler)
    }

    pub fn subscribe_all(&mut self, handler: Handler) -> SubscriptionId {
        self.bus.subscribe_all(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Reset everything and deal a fresh deck sized to `max_rounds`.
    pub fn initialize(&mut self, config: GameConfig) {
        self.countdown = None;
        self.pending_advance = None;
        self.frozen_time_left = None;
        self.state.reset(&config);
        self.config = config;

        let criteria = DeckCriteria {
            categories: self.state.categories.clone(),
            difficulty: self.state.difficulty,
            count: self.state.max_rounds as usize,
        };
        let deck = self.provider.generate_deck(&criteria);
        tracing::debug!(mode = ?self.config.mode, deck = deck.len(), "game initialized");

        self.publish(EngineEvent::GameInitialized {
            config: self.config.clone(),
        });
    }

    /// Seat a player. False once the table is full; no event in that case.
    pub fn add_player(&mut self, player: Player) -> bool {
        if !self.state.add_player(player.clone()) {
            return false;
        }
        self.publish(EngineEvent::PlayerAdded {
            player,
            players: self.state.players.clone(),
        });
        true
    }

    /// Remove a player; the event fires whether or not the id was seated.
    pub fn remove_player(&mut self, player_id: &str) {
        self.state.remove_player(player_id);
        self.publish(EngineEvent::PlayerRemoved {
            player_id: player_id.to_string(),
            players: self.state.players.clone(),
        });
    }

    pub fn start_game(&mut self) -> Result<(), EngineError> {
        if self.state.players.is_empty() {
            return Err(EngineError::NoPlayers);
        }
        self.state.status = GameStatus::Playing;
        self.state.game_start_time = Some(self.clock.now_ms());
        self.state.round = 1;
        tracing::info!(mode = ?self.state.mode, players = self.state.players.len(), "game started");

        self.next_question();
        self.publish(EngineEvent::GameStarted {
            round: self.state.round,
        });
        Ok(())
    }

    /// Resolve the current question for `player_id`. No-op outside an
    /// active round.
    pub fn submit_answer(&mut self, player_id: &str, answer_index: usize) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        let Some(question) = self.state.current_question.clone() else {
            return;
        };

        let now = self.clock.now_ms();
        let response_time_ms = now.saturating_sub(self.state.question_start_time.unwrap_or(now));
        let is_correct = self.provider.check_answer(answer_index);

        if is_correct {
            self.state.stats.correct_answers += 1;
            let points = scoring::calculate_points(
                response_time_ms,
                true,
                self.state.time_limit_secs,
                self.state.difficulty,
            );
            self.state.update_score(player_id, points);
            self.state.update_streak(player_id, true);
        } else {
            self.state.stats.wrong_answers += 1;
            self.state.update_streak(player_id, false);
        }
        self.state.record_response(response_time_ms);
        self.countdown = None;

        self.publish(EngineEvent::AnswerSubmitted {
            player_id: player_id.to_string(),
            answer_index,
            is_correct,
            response_time_ms,
            explanation: question.explanation,
            scores: self.state.scores.clone(),
            streaks: self.state.streaks.clone(),
        });
        self.schedule_advance();
    }

    /// Spend one powerup charge and apply its effect. False when spent.
    pub fn use_powerup(&mut self, player_id: &str, kind: PowerupKind) -> bool {
        if !self.state.use_powerup(player_id, kind) {
            return false;
        }
        match kind {
            PowerupKind::Skip => self.skip_question(),
            PowerupKind::Hint => self.show_hint(),
            PowerupKind::Freeze => self.freeze_opponent(player_id),
        }
        let remaining = self
            .state
            .powerups
            .get(player_id)
            .copied()
            .unwrap_or_default();
        self.publish(EngineEvent::PowerupUsed {
            player_id: player_id.to_string(),
            kind,
            remaining,
        });
        true
    }

    /// Advance past the current question without scoring it.
    fn skip_question(&mut self) {
        self.countdown = None;
        self.pending_advance = None;
        self.advance_round();
    }

    /// Suggest one incorrect option for elimination. The question itself
    /// is not mutated.
    fn show_hint(&mut self) {
        let Some(question) = &self.state.current_question else {
            return;
        };
        let incorrect = question.incorrect_indices();
        if incorrect.is_empty() {
            return;
        }
        let remove_index = incorrect[self.rng.random_range(0..incorrect.len())];
        self.publish(EngineEvent::HintShown { remove_index });
    }

    /// Signal the outside layers to disable the opponent's input for a
    /// fixed window. The engine enforces nothing here.
    fn freeze_opponent(&mut self, player_id: &str) {
        let opponent = self
            .state
            .players
            .iter()
            .find(|p| p.id != player_id)
            .map(|p| p.id.clone());
        if let Some(opponent_id) = opponent {
            self.publish(EngineEvent::PlayerFrozen {
                player_id: opponent_id,
                duration_ms: scoring::FREEZE_DURATION_MS,
            });
        }
    }

    pub fn pause_game(&mut self) {
        if !self.state.pause() {
            return;
        }
        if self.config.preserve_time_on_pause
            && let Some(countdown) = &self.countdown
        {
            self.frozen_time_left = Some(countdown.time_left);
        }
        self.countdown = None;
        self.publish(EngineEvent::GamePaused);
    }

    pub fn resume_game(&mut self) {
        if !self.state.resume() {
            return;
        }
        let now = self.clock.now_ms();
        let secs = self
            .frozen_time_left
            .take()
            .unwrap_or(self.state.time_limit_secs);
        self.start_countdown(secs, now);
        self.publish(EngineEvent::GameResumed);
    }

    /// Cancel timers and return to a fresh waiting state under the same
    /// configuration.
    pub fn reset(&mut self) {
        self.countdown = None;
        self.pending_advance = None;
        self.frozen_time_left = None;
        self.round_token += 1;
        let config = self.config.clone();
        self.state.reset(&config);
        self.provider.reset();
        self.publish(EngineEvent::GameReset);
    }

    /// Resolve any countdown ticks or deferred round advances that have
    /// come due. The host calls this periodically; between calls the
    /// engine holds no threads and no timers.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();

        loop {
            let Some(countdown) = self.countdown.as_mut() else {
                break;
            };
            if now < countdown.next_tick_at {
                break;
            }
            countdown.next_tick_at += scoring::COUNTDOWN_TICK_MS;
            countdown.time_left = countdown.time_left.saturating_sub(1);
            let time_left = countdown.time_left;
            let total = self.state.time_limit_secs;
            self.publish(EngineEvent::TimerUpdate { time_left, total });
            if time_left == 0 {
                self.handle_time_up();
            }
        }

        if let Some(pending) = self.pending_advance
            && now >= pending.due_at
        {
            self.pending_advance = None;
            if pending.token == self.round_token {
                self.advance_round();
            } else {
                tracing::debug!(
                    scheduled = pending.token,
                    current = self.round_token,
                    "dropping stale round advance"
                );
            }
        }
    }

    /// The most recent finished games, newest first.
    pub fn game_history(&self, limit: usize) -> Vec<GameRecord> {
        self.history.recent(limit)
    }

    pub fn player_stats(&self) -> PlayerStats {
        self.history.read_stats()
    }

    fn publish(&mut self, event: EngineEvent) {
        self.bus.publish(&event);
    }

    fn start_countdown(&mut self, secs: u32, now_ms: u64) {
        self.countdown = Some(Countdown {
            time_left: secs,
            next_tick_at: now_ms + scoring::COUNTDOWN_TICK_MS,
        });
    }

    fn schedule_advance(&mut self) {
        self.pending_advance = Some(PendingAdvance {
            due_at: self.clock.now_ms() + scoring::ADVANCE_DELAY_MS,
            token: self.round_token,
        });
    }

    fn advance_round(&mut self) {
        self.round_token += 1;
        self.state.round += 1;
        self.provider.advance();
        self.next_question();
    }

    /// Load the question at the provider cursor, or end the game when
    /// the win condition holds or the deck is exhausted.
    fn next_question(&mut self) {
        let now = self.clock.now_ms();
        if self.state.check_win_condition(now) {
            self.end_game();
            return;
        }
        let Some(question) = self.provider.current().cloned() else {
            self.end_game();
            return;
        };

        self.state.current_question = Some(question.clone());
        self.state.question_start_time = Some(now);
        self.state.stats.total_questions += 1;
        self.start_countdown(self.state.time_limit_secs, now);

        self.publish(EngineEvent::QuestionLoaded {
            question,
            round: self.state.round,
            time_limit_secs: self.state.time_limit_secs,
        });
    }

    fn handle_time_up(&mut self) {
        self.countdown = None;

        if !self.config.multiplayer {
            // Single player: the deadline counts as a wrong answer for the
            // sole player. Multiplayer timeout resolution belongs to the
            // network layer.
            let sole_player = self.state.players.first().map(|p| p.id.clone());
            if let Some(player_id) = sole_player {
                self.state.stats.wrong_answers += 1;
                self.state.update_streak(&player_id, false);
            }
        }

        if let Some(question) = self.state.current_question.clone() {
            self.publish(EngineEvent::TimeUp {
                explanation: question.explanation,
                correct_answer: question.correct,
            });
        }
        self.schedule_advance();
    }

    fn end_game(&mut self) {
        let now = self.clock.now_ms();
        self.countdown = None;
        self.pending_advance = None;
        self.state.status = GameStatus::Finished;
        self.state.game_end_time = Some(now);
        self.state.winner = self.state.leader().cloned();

        let stats = &self.state.stats;
        let accuracy = if stats.total_questions > 0 {
            (f64::from(stats.correct_answers) / f64::from(stats.total_questions) * 100.0).round()
                as u32
        } else {
            0
        };
        let statistics = FinalStats {
            total_questions: stats.total_questions,
            correct_answers: stats.correct_answers,
            wrong_answers: stats.wrong_answers,
            average_response_time_ms: stats.average_response_time_ms.round() as u64,
            fastest_answer_ms: stats.fastest_answer_ms,
            longest_streak: stats.longest_streak,
            game_duration_secs: self.state.elapsed_secs(now),
            accuracy,
        };

        let record = GameRecord {
            id: Uuid::new_v4(),
            timestamp_ms: now,
            mode: self.state.mode,
            difficulty: self.state.difficulty,
            categories: self.state.categories.clone(),
            players: self.state.players.clone(),
            final_scores: self.state.scores.clone(),
            statistics: statistics.clone(),
            winner: self.state.winner.clone(),
        };
        self.persist(&record);

        tracing::info!(
            mode = ?self.state.mode,
            round = self.state.round,
            winner = self.state.winner.as_ref().map(|p| p.name.as_str()),
            "game ended"
        );
        self.publish(EngineEvent::GameEnded {
            winner: self.state.winner.clone(),
            scores: self.state.scores.clone(),
            statistics,
        });
    }

    /// Append the record and fold it into the aggregate player stats.
    /// Wins are attributed to the first-added (local) player.
    fn persist(&mut self, record: &GameRecord) {
        self.history.append(record.clone());

        let mut stats = self.history.read_stats();
        stats.games_played += 1;
        stats.total_score += record
            .final_scores
            .values()
            .map(|&s| i64::from(s))
            .sum::<i64>();
        stats.best_streak = stats.best_streak.max(record.statistics.longest_streak);
        stats.total_questions += record.statistics.total_questions;
        stats.total_correct += record.statistics.correct_answers;
        stats.average_accuracy = if stats.total_questions > 0 {
            (f64::from(stats.total_correct) / f64::from(stats.total_questions) * 100.0).round()
                as u32
        } else {
            0
        };
        if let (Some(winner), Some(local)) = (&record.winner, record.players.first())
            && winner.id == local.id
        {
            stats.games_won += 1;
        }
        self.history.write_stats(stats);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use frenzy_core::config::GameMode;
    use frenzy_core::question::Difficulty;
    use frenzy_core::test_helpers::{ScriptedProvider, make_players};
    use frenzy_core::time::ManualClock;

    use crate::history::MemoryHistory;

    use super::*;

    // ScriptedProvider questions have their correct option at index 1.
    const RIGHT: usize = 1;
    const WRONG: usize = 0;

    fn test_engine(config: GameConfig) -> (GameEngine, ManualClock) {
        let clock = ManualClock::new(100_000);
        let mut engine = GameEngine::with_clock(
            Box::new(ScriptedProvider::repeating(20)),
            Box::new(MemoryHistory::new()),
            Box::new(clock.clone()),
        );
        engine.initialize(config);
        (engine, clock)
    }

    fn started_engine(config: GameConfig, players: usize) -> (GameEngine, ManualClock) {
        let (mut engine, clock) = test_engine(config);
        for player in make_players(players) {
            assert!(engine.add_player(player));
        }
        engine.start_game().unwrap();
        (engine, clock)
    }

    fn record_events(engine: &mut GameEngine) -> Arc<Mutex<Vec<EngineEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        engine.subscribe_all(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        }));
        events
    }

    fn kinds(events: &Arc<Mutex<Vec<EngineEvent>>>) -> Vec<EventKind> {
        events.lock().unwrap().iter().map(|e| e.kind()).collect()
    }

    fn tournament(max_rounds: u32) -> GameConfig {
        GameConfig {
            mode: GameMode::Tournament,
            max_rounds,
            ..GameConfig::default()
        }
    }

    #[test]
    fn start_with_no_players_is_invalid() {
        let (mut engine, _clock) = test_engine(GameConfig::default());
        assert_eq!(engine.start_game(), Err(EngineError::NoPlayers));
        assert_eq!(engine.state().status, GameStatus::Waiting);
    }

    #[test]
    fn start_succeeds_with_one_or_two_players() {
        for n in 1..=2 {
            let (mut engine, _clock) = test_engine(GameConfig::default());
            for player in make_players(n) {
                engine.add_player(player);
            }
            assert!(engine.start_game().is_ok());
            assert_eq!(engine.state().status, GameStatus::Playing);
        }
    }

    #[test]
    fn start_loads_the_first_question() {
        let (mut engine, _clock) = test_engine(GameConfig::default());
        let events = record_events(&mut engine);
        engine.add_player(make_players(1).remove(0));
        engine.start_game().unwrap();

        assert!(engine.state().current_question.is_some());
        assert_eq!(engine.state().round, 1);
        assert_eq!(engine.state().stats.total_questions, 1);
        assert_eq!(
            kinds(&events),
            vec![
                EventKind::PlayerAdded,
                EventKind::QuestionLoaded,
                EventKind::GameStarted,
            ]
        );
    }

    #[test]
    fn third_player_rejected_without_event() {
        let (mut engine, _clock) = test_engine(GameConfig::default());
        for player in make_players(2) {
            engine.add_player(player);
        }
        let events = record_events(&mut engine);
        let extra = Player {
            id: "p3".to_string(),
            name: "Player3".to_string(),
            is_host: false,
        };
        assert!(!engine.add_player(extra));
        assert!(kinds(&events).is_empty());
    }

    #[test]
    fn remove_player_event_fires_unconditionally() {
        let (mut engine, _clock) = test_engine(GameConfig::default());
        let events = record_events(&mut engine);
        engine.remove_player("nobody");
        assert_eq!(kinds(&events), vec![EventKind::PlayerRemoved]);
    }

    #[test]
    fn classic_hard_scenario() {
        // Hard difficulty, 20s limit: an instant correct answer pays 600
        // and starts a streak; a wrong answer on the next submission
        // resets the streak and leaves the score alone.
        let config = GameConfig {
            difficulty: Difficulty::Hard,
            time_limit_secs: 20,
            ..GameConfig::default()
        };
        let (mut engine, _clock) = started_engine(config, 1);

        engine.submit_answer("p1", RIGHT);
        assert_eq!(engine.state().scores["p1"], 600);
        assert_eq!(engine.state().streaks["p1"], 1);

        engine.submit_answer("p1", WRONG);
        assert_eq!(engine.state().streaks["p1"], 0);
        assert_eq!(engine.state().stats.wrong_answers, 1);
        assert_eq!(engine.state().scores["p1"], 600);
    }

    #[test]
    fn answer_event_carries_result_and_tables() {
        let (mut engine, _clock) = started_engine(tournament(5), 1);
        let events = record_events(&mut engine);
        engine.submit_answer("p1", RIGHT);

        let captured = events.lock().unwrap();
        match &captured[0] {
            EngineEvent::AnswerSubmitted {
                player_id,
                is_correct,
                response_time_ms,
                explanation,
                scores,
                streaks,
                ..
            } => {
                assert_eq!(player_id, "p1");
                assert!(*is_correct);
                assert_eq!(*response_time_ms, 0);
                assert!(!explanation.is_empty());
                assert_eq!(scores["p1"], 600);
                assert_eq!(streaks["p1"], 1);
            },
            other => panic!("Expected AnswerSubmitted, got: {other:?}"),
        }
    }

    #[test]
    fn round_advances_only_after_the_delay() {
        let (mut engine, clock) = started_engine(tournament(5), 1);
        engine.submit_answer("p1", RIGHT);
        assert_eq!(engine.state().round, 1);

        clock.advance(scoring::ADVANCE_DELAY_MS - 1);
        engine.tick();
        assert_eq!(engine.state().round, 1);

        clock.advance(1);
        engine.tick();
        assert_eq!(engine.state().round, 2);
        assert!(engine.state().current_question.is_some());
        assert_eq!(engine.state().stats.total_questions, 2);
    }

    #[test]
    fn answer_outside_playing_is_a_noop() {
        let (mut engine, _clock) = test_engine(GameConfig::default());
        engine.add_player(make_players(1).remove(0));
        engine.submit_answer("p1", RIGHT);
        assert_eq!(engine.state().scores["p1"], 0);
        assert_eq!(engine.state().stats.correct_answers, 0);
    }

    #[test]
    fn response_time_reduces_points() {
        let (mut engine, clock) = started_engine(tournament(5), 1);
        clock.advance(10_000);
        engine.tick();
        engine.submit_answer("p1", RIGHT);
        // (100 + 20 * 10) * 1.5 after 10 of 30 seconds spent.
        assert_eq!(engine.state().scores["p1"], 450);
    }

    #[test]
    fn classic_win_ends_game_with_winner() {
        let (mut engine, clock) = started_engine(GameConfig::default(), 1);
        let events = record_events(&mut engine);
        engine.submit_answer("p1", RIGHT);

        clock.advance(scoring::ADVANCE_DELAY_MS);
        engine.tick();

        assert_eq!(engine.state().status, GameStatus::Finished);
        assert_eq!(engine.state().winner.as_ref().unwrap().id, "p1");
        assert!(kinds(&events).contains(&EventKind::GameEnded));
    }

    #[test]
    fn tournament_ends_when_round_passes_max() {
        let (mut engine, clock) = started_engine(tournament(3), 1);
        for round in 1..=3 {
            assert_eq!(engine.state().round, round);
            engine.submit_answer("p1", WRONG);
            clock.advance(scoring::ADVANCE_DELAY_MS);
            engine.tick();
        }
        assert_eq!(engine.state().round, 4);
        assert_eq!(engine.state().status, GameStatus::Finished);
    }

    #[test]
    fn survival_ends_after_three_wrong_answers() {
        let config = GameConfig {
            mode: GameMode::Survival,
            ..GameConfig::default()
        };
        let (mut engine, clock) = started_engine(config, 1);
        for _ in 0..3 {
            engine.submit_answer("p1", WRONG);
            clock.advance(scoring::ADVANCE_DELAY_MS);
            engine.tick();
        }
        assert_eq!(engine.state().stats.wrong_answers, 3);
        assert_eq!(engine.state().lives(), 0);
        assert_eq!(engine.state().status, GameStatus::Finished);
        assert_eq!(engine.state().winner.as_ref().unwrap().id, "p1");
    }

    #[test]
    fn deck_exhaustion_ends_the_game() {
        let clock = ManualClock::new(0);
        let mut engine = GameEngine::with_clock(
            Box::new(ScriptedProvider::repeating(2)),
            Box::new(MemoryHistory::new()),
            Box::new(clock.clone()),
        );
        engine.initialize(tournament(10));
        engine.add_player(make_players(1).remove(0));
        engine.start_game().unwrap();

        for _ in 0..2 {
            engine.submit_answer("p1", WRONG);
            clock.advance(scoring::ADVANCE_DELAY_MS);
            engine.tick();
        }
        assert_eq!(engine.state().status, GameStatus::Finished);
    }

    #[test]
    fn countdown_ticks_down_each_second() {
        let config = GameConfig {
            time_limit_secs: 5,
            ..tournament(5)
        };
        let (mut engine, clock) = started_engine(config, 1);
        let events = record_events(&mut engine);

        clock.advance(2000);
        engine.tick();
        let captured = kinds(&events);
        assert_eq!(
            captured,
            vec![EventKind::TimerUpdate, EventKind::TimerUpdate]
        );
        match events.lock().unwrap().last().unwrap() {
            EngineEvent::TimerUpdate { time_left, total } => {
                assert_eq!(*time_left, 3);
                assert_eq!(*total, 5);
            },
            other => panic!("Expected TimerUpdate, got: {other:?}"),
        }
    }

    #[test]
    fn timeout_counts_as_wrong_for_sole_player() {
        let config = GameConfig {
            time_limit_secs: 5,
            ..tournament(5)
        };
        let (mut engine, clock) = started_engine(config, 1);
        let events = record_events(&mut engine);

        clock.advance(5000);
        engine.tick();

        assert_eq!(engine.state().stats.wrong_answers, 1);
        assert_eq!(engine.state().streaks["p1"], 0);
        assert!(kinds(&events).contains(&EventKind::TimeUp));

        // The same 3-second delay then advances the round.
        clock.advance(scoring::ADVANCE_DELAY_MS);
        engine.tick();
        assert_eq!(engine.state().round, 2);
    }

    #[test]
    fn multiplayer_timeout_defers_resolution() {
        let config = GameConfig {
            time_limit_secs: 5,
            multiplayer: true,
            ..tournament(5)
        };
        let (mut engine, clock) = started_engine(config, 2);
        let events = record_events(&mut engine);

        clock.advance(5000);
        engine.tick();

        assert_eq!(engine.state().stats.wrong_answers, 0);
        assert!(kinds(&events).contains(&EventKind::TimeUp));
    }

    #[test]
    fn answer_cancels_countdown() {
        let (mut engine, clock) = started_engine(tournament(5), 1);
        engine.submit_answer("p1", RIGHT);
        let events = record_events(&mut engine);
        clock.advance(2000);
        engine.tick();
        assert!(!kinds(&events).contains(&EventKind::TimerUpdate));
    }

    #[test]
    fn spent_powerup_returns_false_and_changes_nothing() {
        let (mut engine, _clock) = started_engine(tournament(5), 2);
        assert!(engine.use_powerup("p1", PowerupKind::Freeze));
        let before = engine.snapshot();
        assert!(!engine.use_powerup("p1", PowerupKind::Freeze));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn skip_advances_immediately_without_scoring() {
        let (mut engine, _clock) = started_engine(tournament(5), 1);
        assert!(engine.use_powerup("p1", PowerupKind::Skip));
        assert_eq!(engine.state().round, 2);
        assert_eq!(engine.state().scores["p1"], 0);
        assert_eq!(engine.state().powerups["p1"].skip, 2);
    }

    #[test]
    fn skip_racing_a_scheduled_advance_does_not_double_advance() {
        let (mut engine, clock) = started_engine(tournament(5), 1);
        engine.submit_answer("p1", RIGHT);
        assert!(engine.use_powerup("p1", PowerupKind::Skip));
        assert_eq!(engine.state().round, 2);

        clock.advance(scoring::ADVANCE_DELAY_MS);
        engine.tick();
        assert_eq!(engine.state().round, 2);
    }

    #[test]
    fn hint_suggests_an_incorrect_option() {
        let (mut engine, _clock) = started_engine(tournament(5), 1);
        let events = record_events(&mut engine);
        assert!(engine.use_powerup("p1", PowerupKind::Hint));

        let captured = events.lock().unwrap();
        let correct = engine.state().current_question.as_ref().unwrap().correct;
        match &captured[0] {
            EngineEvent::HintShown { remove_index } => {
                assert_ne!(*remove_index, correct);
                assert!(*remove_index < 4);
            },
            other => panic!("Expected HintShown, got: {other:?}"),
        }
        // The question itself is untouched.
        assert_eq!(
            engine.state().current_question.as_ref().unwrap().options.len(),
            4
        );
    }

    #[test]
    fn freeze_targets_the_opponent() {
        let (mut engine, _clock) = started_engine(tournament(5), 2);
        let events = record_events(&mut engine);
        assert!(engine.use_powerup("p1", PowerupKind::Freeze));

        let captured = events.lock().unwrap();
        match &captured[0] {
            EngineEvent::PlayerFrozen {
                player_id,
                duration_ms,
            } => {
                assert_eq!(player_id, "p2");
                assert_eq!(*duration_ms, scoring::FREEZE_DURATION_MS);
            },
            other => panic!("Expected PlayerFrozen, got: {other:?}"),
        }
    }

    #[test]
    fn pause_stops_the_countdown_and_resume_restarts_it_in_full() {
        let config = GameConfig {
            time_limit_secs: 10,
            ..tournament(5)
        };
        let (mut engine, clock) = started_engine(config, 1);
        clock.advance(3000);
        engine.tick();

        engine.pause_game();
        assert_eq!(engine.state().status, GameStatus::Paused);
        let events = record_events(&mut engine);
        clock.advance(4000);
        engine.tick();
        assert!(!kinds(&events).contains(&EventKind::TimerUpdate));

        engine.resume_game();
        clock.advance(1000);
        engine.tick();
        match events.lock().unwrap().last().unwrap() {
            EngineEvent::TimerUpdate { time_left, .. } => assert_eq!(*time_left, 9),
            other => panic!("Expected TimerUpdate, got: {other:?}"),
        }
    }

    #[test]
    fn preserve_time_policy_resumes_from_remaining() {
        let config = GameConfig {
            time_limit_secs: 10,
            preserve_time_on_pause: true,
            ..tournament(5)
        };
        let (mut engine, clock) = started_engine(config, 1);
        clock.advance(3000);
        engine.tick();

        engine.pause_game();
        engine.resume_game();
        let events = record_events(&mut engine);
        clock.advance(1000);
        engine.tick();
        match events.lock().unwrap().last().unwrap() {
            EngineEvent::TimerUpdate { time_left, .. } => assert_eq!(*time_left, 6),
            other => panic!("Expected TimerUpdate, got: {other:?}"),
        }
    }

    #[test]
    fn pause_outside_playing_is_a_noop() {
        let (mut engine, _clock) = test_engine(GameConfig::default());
        let events = record_events(&mut engine);
        engine.pause_game();
        engine.resume_game();
        assert!(kinds(&events).is_empty());
    }

    #[test]
    fn finished_game_persists_record_and_aggregates() {
        let (mut engine, clock) = started_engine(GameConfig::default(), 1);
        engine.submit_answer("p1", RIGHT);
        clock.advance(scoring::ADVANCE_DELAY_MS);
        engine.tick();
        assert_eq!(engine.state().status, GameStatus::Finished);

        let history = engine.game_history(10);
        assert_eq!(history.len(), 1);
        let record = &history[0];
        assert_eq!(record.final_scores["p1"], 600);
        assert_eq!(record.statistics.accuracy, 100);
        assert_eq!(record.winner.as_ref().unwrap().id, "p1");

        let stats = engine.player_stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.games_won, 1);
        assert_eq!(stats.total_score, 600);
        assert_eq!(stats.average_accuracy, 100);
    }

    #[test]
    fn failing_listener_does_not_disturb_the_engine() {
        let (mut engine, _clock) = test_engine(GameConfig::default());
        engine.subscribe_all(Box::new(|_| Err("listener exploded".into())));
        assert!(engine.add_player(make_players(1).remove(0)));
        assert!(engine.start_game().is_ok());
        assert_eq!(engine.state().status, GameStatus::Playing);
    }

    #[test]
    fn reset_returns_to_waiting_and_emits() {
        let (mut engine, _clock) = started_engine(tournament(5), 1);
        let events = record_events(&mut engine);
        engine.reset();

        assert_eq!(engine.state().status, GameStatus::Waiting);
        assert!(engine.state().players.is_empty());
        assert!(engine.state().current_question.is_none());
        assert_eq!(kinds(&events), vec![EventKind::GameReset]);
    }

    #[test]
    fn snapshot_decodes_back_to_state() {
        let (mut engine, _clock) = started_engine(tournament(5), 1);
        engine.submit_answer("p1", RIGHT);
        let bytes = engine.snapshot();
        let back: GameState = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(back.scores["p1"], engine.state().scores["p1"]);
        assert_eq!(back.round, engine.state().round);
    }

    #[test]
    fn unsubscribed_handler_stops_receiving() {
        let (mut engine, _clock) = test_engine(GameConfig::default());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let id = engine.subscribe(
            EventKind::PlayerAdded,
            Box::new(move |event| {
                sink.lock().unwrap().push(event.kind());
                Ok(())
            }),
        );
        engine.add_player(make_players(1).remove(0));
        assert!(engine.unsubscribe(id));
        engine.remove_player("p1");
        assert_eq!(*events.lock().unwrap(), vec![EventKind::PlayerAdded]);
    }

    #[test]
    fn works_against_the_real_deck_provider() {
        let clock = ManualClock::new(50_000);
        let provider = frenzy_questions::DeckProvider::with_seed(
            frenzy_questions::QuestionBank::builtin(),
            7,
        );
        let mut engine = GameEngine::with_clock(
            Box::new(provider),
            Box::new(MemoryHistory::new()),
            Box::new(clock.clone()),
        );
        engine.initialize(tournament(3));
        engine.add_player(make_players(1).remove(0));
        engine.start_game().unwrap();

        for _ in 0..3 {
            let correct = engine.state().current_question.as_ref().unwrap().correct;
            engine.submit_answer("p1", correct);
            clock.advance(scoring::ADVANCE_DELAY_MS);
            engine.tick();
        }
        assert_eq!(engine.state().status, GameStatus::Finished);
        assert_eq!(engine.state().stats.correct_answers, 3);
        assert!(engine.state().scores["p1"] > 0);
    }
}
