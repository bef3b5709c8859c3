use serde::{Deserialize, Serialize};

use crate::question::{Category, Difficulty};

/// The four game modes, each with its own win condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// First player to reach the target score wins.
    Classic,
    /// Highest score when the fixed time window closes wins.
    Speed,
    /// The game ends when a player runs out of lives.
    Survival,
    /// Fixed number of rounds, highest score wins.
    Tournament,
}

/// Configuration for a game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub categories: Vec<Category>,
    /// Per-question countdown, in seconds.
    pub time_limit_secs: u32,
    pub max_rounds: u32,
    /// When set, per-player timeout resolution is deferred to the network
    /// layer instead of charging the sole local player.
    pub multiplayer: bool,
    /// When set, pausing keeps the remaining countdown and resuming
    /// continues from it; otherwise the countdown restarts from the full
    /// time limit on resume.
    pub preserve_time_on_pause: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            difficulty: Difficulty::Medium,
            categories: Category::ALL.to_vec(),
            time_limit_secs: 30,
            max_rounds: 10,
            multiplayer: false,
            preserve_time_on_pause: false,
        }
    }
}

impl GameConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("FRENZY_CONFIG")
            && let Ok(contents) = std::fs::read_to_string(&path)
            && let Ok(config) = toml::from_str::<Self>(&contents)
        {
            return config;
        }
        if let Ok(contents) = std::fs::read_to_string("config/frenzy.toml")
            && let Ok(config) = toml::from_str::<Self>(&contents)
        {
            return config;
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_session() {
        let config = GameConfig::default();
        assert_eq!(config.mode, GameMode::Classic);
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.categories.len(), 6);
        assert_eq!(config.time_limit_secs, 30);
        assert_eq!(config.max_rounds, 10);
        assert!(!config.multiplayer);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            mode = "survival"
            time_limit_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, GameMode::Survival);
        assert_eq!(config.time_limit_secs, 15);
        assert_eq!(config.max_rounds, 10);
        assert_eq!(config.difficulty, Difficulty::Medium);
    }

    #[test]
    fn mode_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&GameMode::Tournament).unwrap(),
            "\"tournament\""
        );
    }
}
