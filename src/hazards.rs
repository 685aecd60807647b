//! Spike traps that cycle dormant, warning and armed on fixed timers.

use rand::Rng;

use crate::components::Cell;
use crate::config::SpikeConfig;
use crate::rng::RandomStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpikePhase {
    Dormant,
    Warning,
    Armed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpikeTrap {
    pub cell: Cell,
    pub phase: SpikePhase,
    pub timer: f32,
    dormant_for: f32,
}

impl SpikeTrap {
    pub fn new(cell: Cell, dormant_for: f32) -> Self {
        Self {
            cell,
            phase: SpikePhase::Dormant,
            timer: 0.0,
            dormant_for,
        }
    }

    /// Advances the phase clock; returns the new phase when it changed.
    pub fn advance(
        &mut self,
        dt: f32,
        config: &SpikeConfig,
        stream: &mut RandomStream,
    ) -> Option<SpikePhase> {
        self.timer += dt;
        let limit = match self.phase {
            SpikePhase::Dormant => self.dormant_for,
            SpikePhase::Warning => config.warning,
            SpikePhase::Armed => config.armed,
        };
        if self.timer <= limit {
            return None;
        }

        self.timer = 0.0;
        self.phase = match self.phase {
            SpikePhase::Dormant => SpikePhase::Warning,
            SpikePhase::Warning => SpikePhase::Armed,
            SpikePhase::Armed => {
                self.dormant_for = roll_dormant(config, stream);
                SpikePhase::Dormant
            }
        };
        Some(self.phase)
    }

    pub fn is_armed(&self) -> bool {
        self.phase == SpikePhase::Armed
    }
}

pub fn roll_dormant(config: &SpikeConfig, stream: &mut RandomStream) -> f32 {
    if config.dormant_jitter > 0.0 {
        config.dormant_min + stream.gen_range(0.0..config.dormant_jitter)
    } else {
        config.dormant_min
    }
}

/// Any armed spike on `cell`.
pub fn armed_at(spikes: &[SpikeTrap], cell: Cell) -> bool {
    spikes.iter().any(|spike| spike.cell == cell && spike.is_armed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_every_phase() {
        let config = SpikeConfig::default();
        let mut stream = RandomStream::new(1);
        let mut spike = SpikeTrap::new(Cell::new(2, 2), 1.0);

        assert_eq!(spike.advance(0.5, &config, &mut stream), None);
        assert_eq!(
            spike.advance(0.6, &config, &mut stream),
            Some(SpikePhase::Warning)
        );
        assert_eq!(
            spike.advance(0.9, &config, &mut stream),
            Some(SpikePhase::Armed)
        );
        assert!(armed_at(std::slice::from_ref(&spike), Cell::new(2, 2)));
        assert!(!armed_at(std::slice::from_ref(&spike), Cell::new(2, 3)));
        assert_eq!(
            spike.advance(1.3, &config, &mut stream),
            Some(SpikePhase::Dormant)
        );
        assert!(!spike.is_armed());
    }

    #[test]
    fn dormant_rolls_stay_within_jitter() {
        let config = SpikeConfig::default();
        let mut stream = RandomStream::new(99);
        for _ in 0..500 {
            let roll = roll_dormant(&config, &mut stream);
            assert!(roll >= config.dormant_min);
            assert!(roll < config.dormant_min + config.dormant_jitter);
        }
    }

    #[test]
    fn zero_jitter_rolls_the_minimum() {
        let config = SpikeConfig {
            dormant_jitter: 0.0,
            ..SpikeConfig::default()
        };
        let mut stream = RandomStream::new(5);
        assert_eq!(roll_dormant(&config, &mut stream), config.dormant_min);
    }
}
