use tracing::trace;

use crate::components::Cell;
use crate::config::ChaserConfig;
use crate::maze::{self, Grid};

/// First floor on which the chaser is active from the moment it is generated.
pub const CHASER_INTRO_FLOOR: u32 = 2;

/// Step interval for `floor`: `base * decay^(floor - 2)`, never below `min`.
pub fn interval_for_floor(config: &ChaserConfig, floor: u32) -> f32 {
    let floors_after_intro = floor.saturating_sub(CHASER_INTRO_FLOOR);
    let scale = config.floor_decay.powi(floors_after_intro as i32);
    (config.base_interval * scale).max(config.min_interval)
}

/// Result of advancing the chaser for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaserOutcome {
    Inactive,
    /// Number of tiles moved this tick (possibly zero).
    Moved(u32),
    /// Landed on the player while the player was vulnerable.
    Caught,
}

/// Pursuer that re-paths toward the player on every step.
#[derive(Debug, Clone, PartialEq)]
pub struct ChaserAgent {
    pub cell: Cell,
    pub step_timer: f32,
    pub step_interval: f32,
    pub active: bool,
    /// Latched the first time the chaser ever activates.
    pub has_spawned: bool,
    /// Countdown before a delayed activation; `None` when no delay is armed.
    pub spawn_timer: Option<f32>,
}

impl ChaserAgent {
    pub fn new(cell: Cell, step_interval: f32) -> Self {
        Self {
            cell,
            step_timer: 0.0,
            step_interval,
            active: false,
            has_spawned: false,
            spawn_timer: None,
        }
    }

    /// Repositions for a fresh floor without touching the spawn latch.
    pub fn place(&mut self, cell: Cell, step_interval: f32) {
        self.cell = cell;
        self.step_timer = 0.0;
        self.step_interval = step_interval;
    }

    pub fn reset_to(&mut self, cell: Cell) {
        self.cell = cell;
        self.step_timer = 0.0;
    }

    /// Marks the chaser active. Returns `true` only on the first activation ever.
    pub fn activate(&mut self) -> bool {
        self.active = true;
        self.spawn_timer = None;
        self.step_timer = 0.0;
        if self.has_spawned {
            false
        } else {
            self.has_spawned = true;
            true
        }
    }

    /// Counts down an armed spawn delay. Returns `true` when it runs out.
    pub fn tick_spawn_delay(&mut self, dt: f32) -> bool {
        if self.has_spawned || self.active {
            return false;
        }
        match self.spawn_timer.as_mut() {
            Some(timer) if *timer > 0.0 => {
                *timer -= dt;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn effective_interval(&self, config: &ChaserConfig, slowed: bool) -> f32 {
        let mut interval = if self.step_interval > 0.0 {
            self.step_interval
        } else {
            config.min_interval
        };
        if slowed {
            interval *= config.slow_time_stretch;
        }
        interval.max(config.min_interval)
    }

    /// Steps toward `target` as often as the accumulated time allows.
    ///
    /// At most `max_steps_per_tick` steps are taken; leftover time beyond one
    /// interval is dropped so a long frame cannot teleport the chaser. Stops at
    /// the first step that lands on `target` while `can_catch` holds.
    pub fn advance(
        &mut self,
        grid: &Grid,
        target: Cell,
        dt: f32,
        config: &ChaserConfig,
        slowed: bool,
        can_catch: bool,
    ) -> ChaserOutcome {
        if !self.active {
            return ChaserOutcome::Inactive;
        }
        self.step_timer += dt;
        let interval = self.effective_interval(config, slowed);

        let mut steps = 0;
        let mut moved = 0;
        while self.step_timer >= interval && steps < config.max_steps_per_tick {
            self.step_timer -= interval;
            steps += 1;

            let Some(next) = next_step(grid, self.cell, target) else {
                break;
            };
            trace!(from = ?self.cell, to = ?next, "chaser step");
            self.cell = next;
            moved += 1;

            if self.cell == target && can_catch {
                return ChaserOutcome::Caught;
            }
        }

        if steps >= config.max_steps_per_tick {
            self.step_timer = self.step_timer.min(interval);
        }
        ChaserOutcome::Moved(moved)
    }
}

/// First cell on a shortest route from `from` to `to`.
pub fn next_step(grid: &Grid, from: Cell, to: Cell) -> Option<Cell> {
    maze::shortest_path(grid, from, to).and_then(|path| path.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Tile;

    fn line(len: usize) -> Grid {
        let mut grid = Grid::filled(len + 2, 3, Tile::Wall);
        for x in 1..=len {
            grid.set(Cell::new(x, 1), Tile::Open);
        }
        grid
    }

    fn active_at(x: usize, interval: f32) -> ChaserAgent {
        let mut chaser = ChaserAgent::new(Cell::new(x, 1), interval);
        let _ = chaser.activate();
        chaser
    }

    #[test]
    fn interval_shrinks_per_floor_down_to_the_minimum() {
        let config = ChaserConfig::default();
        assert_eq!(interval_for_floor(&config, 1), config.base_interval);
        assert_eq!(interval_for_floor(&config, 2), config.base_interval);
        let mut previous = interval_for_floor(&config, 2);
        for floor in 3..80 {
            let current = interval_for_floor(&config, floor);
            assert!(current <= previous, "floor {floor}");
            assert!(current >= config.min_interval);
            previous = current;
        }
        assert_eq!(interval_for_floor(&config, 79), config.min_interval);
    }

    #[test]
    fn steps_one_tile_per_interval_toward_the_target() {
        let grid = line(8);
        let config = ChaserConfig::default();
        let mut chaser = active_at(8, 0.18);
        let outcome = chaser.advance(&grid, Cell::new(1, 1), 0.2, &config, false, true);
        assert_eq!(outcome, ChaserOutcome::Moved(1));
        assert_eq!(chaser.cell, Cell::new(7, 1));
    }

    #[test]
    fn bounded_steps_on_a_long_frame() {
        let grid = line(20);
        let config = ChaserConfig::default();
        let mut chaser = active_at(20, 0.06);
        let outcome = chaser.advance(&grid, Cell::new(1, 1), 10.0, &config, false, true);
        assert_eq!(outcome, ChaserOutcome::Moved(config.max_steps_per_tick));
        assert_eq!(chaser.cell, Cell::new(15, 1));
        assert!(chaser.step_timer <= 0.06);
    }

    #[test]
    fn catches_when_landing_on_a_vulnerable_target() {
        let grid = line(4);
        let config = ChaserConfig::default();
        let mut chaser = active_at(3, 0.1);
        let outcome = chaser.advance(&grid, Cell::new(2, 1), 0.1, &config, false, true);
        assert_eq!(outcome, ChaserOutcome::Caught);
    }

    #[test]
    fn protected_target_is_not_caught() {
        let grid = line(4);
        let config = ChaserConfig::default();
        let mut chaser = active_at(3, 0.1);
        let outcome = chaser.advance(&grid, Cell::new(2, 1), 0.3, &config, false, false);
        assert_eq!(outcome, ChaserOutcome::Moved(1));
        assert_eq!(chaser.cell, Cell::new(2, 1));
    }

    #[test]
    fn no_route_leaves_the_chaser_in_place() {
        let mut grid = line(6);
        grid.set(Cell::new(3, 1), Tile::Wall);
        let config = ChaserConfig::default();
        let mut chaser = active_at(6, 0.1);
        let outcome = chaser.advance(&grid, Cell::new(1, 1), 0.5, &config, false, true);
        assert_eq!(outcome, ChaserOutcome::Moved(0));
        assert_eq!(chaser.cell, Cell::new(6, 1));
    }

    #[test]
    fn slow_time_stretches_the_interval() {
        let config = ChaserConfig::default();
        let chaser = active_at(1, 0.1);
        let slowed = chaser.effective_interval(&config, true);
        assert!((slowed - 0.14).abs() < 1e-5);
        assert!((chaser.effective_interval(&config, false) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn inactive_chaser_does_nothing() {
        let grid = line(4);
        let config = ChaserConfig::default();
        let mut chaser = ChaserAgent::new(Cell::new(4, 1), 0.1);
        let outcome = chaser.advance(&grid, Cell::new(1, 1), 1.0, &config, false, true);
        assert_eq!(outcome, ChaserOutcome::Inactive);
        assert_eq!(chaser.cell, Cell::new(4, 1));
    }

    #[test]
    fn activation_latches_once() {
        let mut chaser = ChaserAgent::new(Cell::new(1, 1), 0.1);
        assert!(chaser.activate());
        chaser.active = false;
        assert!(!chaser.activate());
    }

    #[test]
    fn spawn_delay_counts_down_then_fires() {
        let mut chaser = ChaserAgent::new(Cell::new(1, 1), 0.1);
        assert!(!chaser.tick_spawn_delay(1.0));
        chaser.spawn_timer = Some(0.5);
        assert!(!chaser.tick_spawn_delay(0.3));
        assert!(!chaser.tick_spawn_delay(0.3));
        assert!(chaser.tick_spawn_delay(0.016));
    }
}
