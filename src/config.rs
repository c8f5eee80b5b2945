use serde::Deserialize;
use std::error::Error;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub username: String,
    /// Seconds between two virus actions at the start of a game.
    pub initial_speed: f64,
    /// The interval never drops below this.
    pub min_speed: f64,
    /// Applied to the interval on every incorrect virus deletion.
    pub speed_factor: f64,
    pub virus_count: u32,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            username: "player".to_string(),
            initial_speed: 60.0,
            min_speed: 5.0,
            speed_factor: 0.75,
            virus_count: 5,
            seed: None,
        }
    }
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid configuration: {}", self.message)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

impl Error for ConfigError {}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl GameConfig {
    pub fn from_json(text: &str) -> Result<GameConfig> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<GameConfig> {
        let text = std::fs::read_to_string(path)?;
        tracing::info!("Loaded configuration from {}", path.display());
        GameConfig::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.username.contains('/') {
            return Err(ConfigError {
                message: format!("username `{}` is not a valid directory name", self.username),
            });
        }
        if !(self.speed_factor > 0.0 && self.speed_factor <= 1.0) {
            return Err(ConfigError {
                message: format!("speed_factor must be in (0, 1], got {}", self.speed_factor),
            });
        }
        if self.min_speed <= 0.0 || self.initial_speed < self.min_speed {
            return Err(ConfigError {
                message: "initial_speed must be at least min_speed, and both positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{"username": "alice", "seed": 7}"#).unwrap();
        assert_eq!(config.username, "alice");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.virus_count, GameConfig::default().virus_count);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(GameConfig::from_json(r#"{"speed_factor": 1.5}"#).is_err());
        assert!(GameConfig::from_json(r#"{"username": "a/b"}"#).is_err());
        assert!(GameConfig::from_json(r#"{"initial_speed": 1.0, "min_speed": 2.0}"#).is_err());
        assert!(GameConfig::from_json("not json").is_err());
    }
}
