use serde::{Deserialize, Serialize};

/// Unique identifier for a player. Ids originate outside the engine
/// (lobby or transport layer), so they are opaque strings.
pub type PlayerId = String;

/// Maximum number of players in a game session.
pub const MAX_PLAYERS: usize = 2;

/// A player seated at a game session. Immutable once added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
}
