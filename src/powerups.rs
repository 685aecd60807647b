//! Collectable power-ups and their running timers.

use crate::config::PowerUpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    Speed,
    Invulnerable,
    Magnet,
    SlowTime,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Speed,
        PowerUpKind::Invulnerable,
        PowerUpKind::Magnet,
        PowerUpKind::SlowTime,
    ];

    fn slot(self) -> usize {
        match self {
            PowerUpKind::Speed => 0,
            PowerUpKind::Invulnerable => 1,
            PowerUpKind::Magnet => 2,
            PowerUpKind::SlowTime => 3,
        }
    }

    pub fn duration(self, config: &PowerUpConfig) -> f32 {
        match self {
            PowerUpKind::Speed => config.speed_duration,
            PowerUpKind::Invulnerable => config.invulnerable_duration,
            PowerUpKind::Magnet => config.magnet_duration,
            PowerUpKind::SlowTime => config.slow_time_duration,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerTimer {
    pub on: bool,
    pub elapsed: f32,
    pub duration: f32,
}

impl PowerTimer {
    pub fn remaining(&self) -> f32 {
        if self.on {
            (self.duration - self.elapsed).max(0.0)
        } else {
            0.0
        }
    }
}

/// Timers for every power-up kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivePowerUps {
    timers: [PowerTimer; 4],
}

impl ActivePowerUps {
    /// Starts `kind`, or restarts it if it is already running.
    pub fn activate(&mut self, kind: PowerUpKind, duration: f32) {
        self.timers[kind.slot()] = PowerTimer {
            on: true,
            elapsed: 0.0,
            duration,
        };
    }

    pub fn is_on(&self, kind: PowerUpKind) -> bool {
        self.timers[kind.slot()].on
    }

    pub fn timer(&self, kind: PowerUpKind) -> PowerTimer {
        self.timers[kind.slot()]
    }

    /// Advances every running timer and returns the kinds that ran out.
    pub fn advance(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            let timer = &mut self.timers[kind.slot()];
            if !timer.on {
                continue;
            }
            timer.elapsed += dt;
            if timer.elapsed >= timer.duration {
                *timer = PowerTimer::default();
                expired.push(kind);
            }
        }
        expired
    }
}
