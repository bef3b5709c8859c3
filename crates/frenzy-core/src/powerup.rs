use serde::{Deserialize, Serialize};

/// The three limited-use powerup actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerupKind {
    /// Advance to the next question without scoring this round.
    Skip,
    /// Suggest eliminating one incorrect option.
    Hint,
    /// Signal the UI/network layer to disable the opponent's input.
    Freeze,
}

/// Per-player powerup charges. Every player starts with 3/2/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerupInventory {
    pub skip: u8,
    pub hint: u8,
    pub freeze: u8,
}

impl Default for PowerupInventory {
    fn default() -> Self {
        Self {
            skip: 3,
            hint: 2,
            freeze: 1,
        }
    }
}

impl PowerupInventory {
    /// Consume one charge of `kind`. Returns false (without mutating)
    /// when the counter is already at zero.
    pub fn take(&mut self, kind: PowerupKind) -> bool {
        let counter = match kind {
            PowerupKind::Skip => &mut self.skip,
            PowerupKind::Hint => &mut self.hint,
            PowerupKind::Freeze => &mut self.freeze,
        };
        if *counter == 0 {
            return false;
        }
        *counter -= 1;
        true
    }

    pub fn remaining(&self, kind: PowerupKind) -> u8 {
        match kind {
            PowerupKind::Skip => self.skip,
            PowerupKind::Hint => self.hint,
            PowerupKind::Freeze => self.freeze,
        }
    }
}
