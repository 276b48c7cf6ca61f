//! Generator configuration
//!
//! All options can be loaded from JSON; missing fields fall back to the
//! defaults below.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Size;

/// Which stages start automatically once the previous one completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoGenerate {
    /// Start partitioning as soon as the generator is created
    pub rooms: bool,
    /// Place doors when rooms complete
    pub doors: bool,
    /// Prune and connect when doors complete
    pub connections: bool,
}

impl Default for AutoGenerate {
    fn default() -> Self {
        Self {
            rooms: true,
            doors: true,
            connections: true,
        }
    }
}

/// Options recognised by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub dungeon_size: Size,
    pub room_min_size: Size,
    pub room_max_size: Size,
    /// Probability of preferring a horizontal split (cut along X)
    pub split_direction_bias: f32,
    /// Probability of keeping a room that already fits `room_max_size`
    pub large_room_chance: f32,
    pub door_min_size: i32,
    pub door_max_size: i32,
    /// Clearance kept between a door and the perpendicular walls
    pub min_distance_from_walls: i32,
    /// Fraction of rooms the pruning pass may remove
    pub remove_ratio: f32,
    /// Pause between steps, in seconds
    pub execution_delay: f32,
    pub auto_generate: AutoGenerate,
    /// Whether the passes emit draw commands at all
    pub emit_draw_commands: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            dungeon_size: Size::new(50, 100),
            room_min_size: Size::new(5, 10),
            room_max_size: Size::new(15, 20),
            split_direction_bias: 0.5,
            large_room_chance: 0.1,
            door_min_size: 2,
            door_max_size: 4,
            min_distance_from_walls: 1,
            remove_ratio: 0.2,
            execution_delay: 0.0,
            auto_generate: AutoGenerate::default(),
            emit_draw_commands: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values that would make generation loop forever or draw from
    /// an invalid distribution. Oversized room minimums are accepted: they
    /// degenerate to a single room.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = self.room_min_size;
        if min.width < 1 || min.height < 1 {
            return Err(ConfigError::RoomMinSize {
                width: min.width,
                height: min.height,
            });
        }

        let size = self.dungeon_size;
        if size.width < 0 || size.height < 0 {
            return Err(ConfigError::DungeonSize {
                width: size.width,
                height: size.height,
            });
        }

        for (name, value) in [
            ("split_direction_bias", self.split_direction_bias),
            ("large_room_chance", self.large_room_chance),
            ("remove_ratio", self.remove_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }

        if self.door_min_size < 1 || self.door_min_size > self.door_max_size {
            return Err(ConfigError::DoorSize {
                min: self.door_min_size,
                max: self.door_max_size,
            });
        }

        if self.min_distance_from_walls < 0 {
            return Err(ConfigError::WallDistance(self.min_distance_from_walls));
        }

        if self.execution_delay < 0.0 || Duration::try_from_secs_f32(self.execution_delay).is_err() {
            return Err(ConfigError::ExecutionDelay(self.execution_delay));
        }

        Ok(())
    }

    /// Pacing delay between generation steps
    pub fn execution_delay(&self) -> Duration {
        Duration::try_from_secs_f32(self.execution_delay).unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GeneratorConfig::from_json_str(
            r#"{ "seed": 17, "dungeon_size": { "width": 80, "height": 40 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 17);
        assert_eq!(config.dungeon_size, Size::new(80, 40));
        assert_eq!(config.room_min_size, GeneratorConfig::default().room_min_size);
        assert!(config.auto_generate.doors);
    }

    #[test]
    fn test_oversized_room_min_is_accepted() {
        let config = GeneratorConfig {
            dungeon_size: Size::new(4, 4),
            room_min_size: Size::new(10, 10),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_room_min_rejected() {
        let config = GeneratorConfig {
            room_min_size: Size::new(0, 5),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RoomMinSize { width: 0, height: 5 })
        ));
    }

    #[test]
    fn test_probability_out_of_range() {
        let config = GeneratorConfig {
            remove_ratio: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability {
                name: "remove_ratio",
                ..
            })
        ));

        let config = GeneratorConfig {
            split_direction_bias: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_door_sizes_checked() {
        let config = GeneratorConfig {
            door_min_size: 5,
            door_max_size: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DoorSize { min: 5, max: 3 })
        ));
    }

    #[test]
    fn test_negative_delay_rejected() {
        for delay in [-0.5, 1e30, f32::INFINITY, f32::NAN] {
            let config = GeneratorConfig {
                execution_delay: delay,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ExecutionDelay(_))
            ));
            assert_eq!(config.execution_delay(), Duration::ZERO);
        }
    }

    #[test]
    fn test_execution_delay_duration() {
        let config = GeneratorConfig {
            execution_delay: 0.25,
            ..Default::default()
        };
        assert_eq!(config.execution_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            GeneratorConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
