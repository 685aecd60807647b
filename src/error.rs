use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::CrawlerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "grid must be odd-sized and at least {min}x{min}, got {width}x{height}",
        min = crate::maze::MIN_GRID_SIZE
    )]
    GridSize { width: usize, height: usize },
    #[error("base grid size {0} is below the minimum of 13 or is even")]
    BaseGridSize(usize),
    #[error("`{name}` must be a positive number of seconds, got {value}")]
    NonPositiveDuration { name: &'static str, value: f32 },
    #[error("chaser minimum interval {min} exceeds its base interval {base}")]
    IntervalOrder { min: f32, base: f32 },
    #[error("`{name}` must lie in (0, 1], got {value}")]
    FactorOutOfRange { name: &'static str, value: f32 },
    #[error("`{name}` must be at least 1")]
    ZeroCount { name: &'static str },
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}
