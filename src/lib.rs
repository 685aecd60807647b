//! Simulation core for a corridor crawler: a single winding corridor per floor,
//! a sliding player, a pursuing chaser, spike traps, power-ups and combo scoring.
//!
//! The core owns no clock and draws nothing. A host calls
//! [`RoundController::tick`] once per frame, forwards input, and renders from
//! [`RoundController::snapshot`].

pub mod chaser;
pub mod components;
pub mod config;
pub mod error;
pub mod hazards;
pub mod level;
pub mod maze;
pub mod player;
pub mod powerups;
pub mod rng;
pub mod round;
pub mod theme;

pub use components::{Cell, Dir, Tile};
pub use config::CrawlerConfig;
pub use error::ConfigError;
pub use round::{EffectSink, NoEffects, RoundController, RoundScore, RoundSnapshot};
pub use theme::{ColorToken, Theme};
