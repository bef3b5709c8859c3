use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use frenzy_core::events::EngineEvent;
use frenzy_core::player::{Player, PlayerId};
use frenzy_core::powerup::PowerupKind;

use crate::engine::GameEngine;

/// How often the session loop resolves engine deadlines. Countdown
/// granularity is one second, so a quarter-second poll keeps timer
/// updates visually smooth without busy-spinning.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Commands sent from the host (UI layer, simulated peer) to the
/// session loop.
#[derive(Debug)]
pub enum SessionCommand {
    AddPlayer(Player),
    RemovePlayer(PlayerId),
    Start,
    Answer {
        player_id: PlayerId,
        answer_index: usize,
    },
    Powerup {
        player_id: PlayerId,
        kind: PowerupKind,
    },
    Pause,
    Resume,
    Reset,
    Stop,
}

/// Broadcasts sent from the session loop back to the host.
#[derive(Debug, Clone)]
pub enum SessionBroadcast {
    /// A game event, in emission order.
    Event(EngineEvent),
    /// The loop has exited; no further events will arrive.
    Stopped,
}

/// Drive an engine on a tokio task. Every event the engine emits is
/// forwarded on the broadcast channel; commands are applied in arrival
/// order between ticks.
///
/// The engine should already be initialized; events emitted before this
/// call are not replayed.
pub fn spawn_session(
    mut engine: GameEngine,
) -> (
    mpsc::UnboundedSender<SessionCommand>,
    mpsc::UnboundedReceiver<SessionBroadcast>,
    JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let forward_tx = broadcast_tx.clone();
    engine.subscribe_all(Box::new(move |event| {
        // A closed channel means the host is gone; the loop exits on the
        // command side, so drop the event rather than erroring.
        let _ = forward_tx.send(SessionBroadcast::Event(event.clone()));
        Ok(())
    }));

    let handle = tokio::spawn(async move {
        run_session_loop(engine, cmd_rx, broadcast_tx).await;
    });

    (cmd_tx, broadcast_rx, handle)
}

async fn run_session_loop(
    mut engine: GameEngine,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    broadcast_tx: mpsc::UnboundedSender<SessionBroadcast>,
) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                engine.tick();
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::AddPlayer(player)) => {
                        if !engine.add_player(player) {
                            tracing::warn!("player rejected, table is full");
                        }
                    },
                    Some(SessionCommand::RemovePlayer(player_id)) => {
                        engine.remove_player(&player_id);
                    },
                    Some(SessionCommand::Start) => {
                        if let Err(e) = engine.start_game() {
                            tracing::warn!(error = %e, "start rejected");
                        }
                    },
                    Some(SessionCommand::Answer { player_id, answer_index }) => {
                        engine.submit_answer(&player_id, answer_index);
                    },
                    Some(SessionCommand::Powerup { player_id, kind }) => {
                        engine.use_powerup(&player_id, kind);
                    },
                    Some(SessionCommand::Pause) => engine.pause_game(),
                    Some(SessionCommand::Resume) => engine.resume_game(),
                    Some(SessionCommand::Reset) => engine.reset(),
                    Some(SessionCommand::Stop) | None => break,
                }
            }
        }
    }

    let _ = broadcast_tx.send(SessionBroadcast::Stopped);
}
