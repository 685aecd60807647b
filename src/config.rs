//! Tunable constants for a run, loadable from partial TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SEED: u32 = 987_654_321;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base seed; floor `n` is laid out from `seed + n * 1337`.
    pub seed: u32,
    pub base_grid_size: usize,
    pub growth_per_floor: usize,
    /// Seconds for one tile-to-tile slide.
    pub slide_duration: f32,
    /// Upper clamp applied to every tick delta.
    pub max_frame_delta: f32,
    pub chaser: ChaserConfig,
    pub scoring: ScoringConfig,
    pub spikes: SpikeConfig,
    pub powerups: PowerUpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaserConfig {
    pub base_interval: f32,
    pub min_interval: f32,
    /// Interval multiplier per floor past floor 2.
    pub floor_decay: f32,
    /// Interval multiplier while slow time is active.
    pub slow_time_stretch: f32,
    pub max_steps_per_tick: u32,
    /// When set, the chaser appears on floor 1 after this many seconds.
    pub first_floor_spawn_delay: Option<f32>,
    pub spawn_protection: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub coin_value: u32,
    pub big_coin_value: u32,
    /// Corridor stride between pickups.
    pub coin_stride: usize,
    /// Every n-th placed pickup becomes a big coin.
    pub big_coin_every: usize,
    pub coin_combo_window: f32,
    pub big_coin_combo_window: f32,
    pub big_coin_combo_bonus: u32,
    pub clear_bonus: u32,
    pub catch_penalty: u32,
    pub trap_penalty: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    pub first_floor: u32,
    pub max_spikes: usize,
    pub dormant_min: f32,
    pub dormant_jitter: f32,
    pub warning: f32,
    pub armed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub first_floor: u32,
    pub speed_duration: f32,
    /// Slide duration multiplier while speed is active.
    pub speed_factor: f32,
    pub invulnerable_duration: f32,
    pub magnet_duration: f32,
    pub magnet_radius: usize,
    pub slow_time_duration: f32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            base_grid_size: 13,
            growth_per_floor: 2,
            slide_duration: 0.09,
            max_frame_delta: 0.12,
            chaser: ChaserConfig::default(),
            scoring: ScoringConfig::default(),
            spikes: SpikeConfig::default(),
            powerups: PowerUpConfig::default(),
        }
    }
}

impl Default for ChaserConfig {
    fn default() -> Self {
        Self {
            base_interval: 0.18,
            min_interval: 0.06,
            floor_decay: 0.92,
            slow_time_stretch: 1.4,
            max_steps_per_tick: 5,
            first_floor_spawn_delay: None,
            spawn_protection: 2.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            coin_value: 10,
            big_coin_value: 50,
            coin_stride: 3,
            big_coin_every: 6,
            coin_combo_window: 2.0,
            big_coin_combo_window: 2.6,
            big_coin_combo_bonus: 2,
            clear_bonus: 100,
            catch_penalty: 25,
            trap_penalty: 10,
        }
    }
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            first_floor: 2,
            max_spikes: 6,
            dormant_min: 3.0,
            dormant_jitter: 4.0,
            warning: 0.8,
            armed: 1.2,
        }
    }
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            first_floor: 3,
            speed_duration: 5.0,
            speed_factor: 0.65,
            invulnerable_duration: 4.0,
            magnet_duration: 6.0,
            magnet_radius: 2,
            slow_time_duration: 5.0,
        }
    }
}

impl CrawlerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: CrawlerConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_grid_size < 13 || self.base_grid_size % 2 == 0 {
            return Err(ConfigError::BaseGridSize(self.base_grid_size));
        }

        positive("slide_duration", self.slide_duration)?;
        positive("max_frame_delta", self.max_frame_delta)?;
        positive("chaser.base_interval", self.chaser.base_interval)?;
        positive("chaser.min_interval", self.chaser.min_interval)?;
        positive("chaser.spawn_protection", self.chaser.spawn_protection)?;
        if let Some(delay) = self.chaser.first_floor_spawn_delay {
            positive("chaser.first_floor_spawn_delay", delay)?;
        }
        if self.chaser.min_interval > self.chaser.base_interval {
            return Err(ConfigError::IntervalOrder {
                min: self.chaser.min_interval,
                base: self.chaser.base_interval,
            });
        }
        unit_factor("chaser.floor_decay", self.chaser.floor_decay)?;
        if self.chaser.slow_time_stretch < 1.0 {
            return Err(ConfigError::FactorOutOfRange {
                name: "chaser.slow_time_stretch",
                value: self.chaser.slow_time_stretch,
            });
        }
        if self.chaser.max_steps_per_tick == 0 {
            return Err(ConfigError::ZeroCount {
                name: "chaser.max_steps_per_tick",
            });
        }

        if self.scoring.coin_stride == 0 {
            return Err(ConfigError::ZeroCount {
                name: "scoring.coin_stride",
            });
        }
        if self.scoring.big_coin_every == 0 {
            return Err(ConfigError::ZeroCount {
                name: "scoring.big_coin_every",
            });
        }
        positive("scoring.coin_combo_window", self.scoring.coin_combo_window)?;
        positive("scoring.big_coin_combo_window", self.scoring.big_coin_combo_window)?;

        positive("spikes.warning", self.spikes.warning)?;
        positive("spikes.armed", self.spikes.armed)?;
        positive("spikes.dormant_min", self.spikes.dormant_min)?;

        positive("powerups.speed_duration", self.powerups.speed_duration)?;
        unit_factor("powerups.speed_factor", self.powerups.speed_factor)?;
        positive(
            "powerups.invulnerable_duration",
            self.powerups.invulnerable_duration,
        )?;
        positive("powerups.magnet_duration", self.powerups.magnet_duration)?;
        positive("powerups.slow_time_duration", self.powerups.slow_time_duration)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveDuration { name, value })
    }
}

fn unit_factor(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::FactorOutOfRange { name, value })
    }
}
