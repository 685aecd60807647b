//! Round orchestration: input, movement, pursuit, hazards, scoring and floors.

use tracing::{debug, info};

use crate::chaser::{self, ChaserAgent, ChaserOutcome, CHASER_INTRO_FLOOR};
use crate::components::{Cell, Dir};
use crate::config::CrawlerConfig;
use crate::error::ConfigError;
use crate::hazards::{self, SpikeTrap};
use crate::level::{GridWorld, Pickup, PickupKind};
use crate::maze::{Corridor, Grid};
use crate::player::PlayerMotion;
use crate::powerups::{ActivePowerUps, PowerUpKind};
use crate::theme::{ColorToken, Theme};

/// Particles spawned per collected coin.
const PICKUP_PARTICLES: u32 = 8;

/// Cosmetic callbacks the core fires once per resolved event.
///
/// Nothing a sink does feeds back into the simulation.
pub trait EffectSink {
    fn particle_burst(&mut self, cell: Cell, color: ColorToken, count: u32);
    fn ripple(&mut self, cell: Cell, color: ColorToken);
}

/// Sink that drops every effect, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl EffectSink for NoEffects {
    fn particle_burst(&mut self, _cell: Cell, _color: ColorToken, _count: u32) {}

    fn ripple(&mut self, _cell: Cell, _color: ColorToken) {}
}

/// Immunity window granted when the chaser first appears.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnProtection {
    pub on: bool,
    pub elapsed: f32,
    pub duration: f32,
}

impl SpawnProtection {
    pub fn new(duration: f32) -> Self {
        Self {
            on: false,
            elapsed: 0.0,
            duration,
        }
    }

    pub fn grant(&mut self) {
        self.on = true;
        self.elapsed = 0.0;
    }

    /// Returns `true` on the tick the window closes.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.on {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.on = false;
            self.elapsed = 0.0;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundScore {
    pub score: u32,
    pub combo: u32,
    pub combo_timer: f32,
    pub floor: u32,
    /// Best score seen at any floor clear.
    pub high_score: u32,
}

impl Default for RoundScore {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 1,
            combo_timer: 0.0,
            floor: 1,
            high_score: 0,
        }
    }
}

impl RoundScore {
    fn award(&mut self, value: u32, combo_step: u32, window: f32) {
        self.score = self.score.saturating_add(value.saturating_mul(self.combo));
        self.combo += combo_step;
        self.combo_timer = window;
    }

    fn penalize(&mut self, penalty: u32) {
        self.score = self.score.saturating_sub(penalty);
        self.reset_combo();
    }

    fn reset_combo(&mut self) {
        self.combo = 1;
        self.combo_timer = 0.0;
    }

    fn advance_combo(&mut self, dt: f32) {
        if self.combo_timer > 0.0 {
            self.combo_timer -= dt;
            if self.combo_timer <= 0.0 {
                self.combo = 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    Catch,
    Trap,
}

/// Read-only view handed to renderers each frame.
#[derive(Debug, Clone, Copy)]
pub struct RoundSnapshot<'a> {
    pub grid: &'a Grid,
    pub corridor: &'a Corridor,
    pub player: &'a PlayerMotion,
    pub slide_duration: f32,
    pub chaser: &'a ChaserAgent,
    pub pickups: &'a [Pickup],
    pub spikes: &'a [SpikeTrap],
    pub score: RoundScore,
    pub powerups: &'a ActivePowerUps,
    pub protection: SpawnProtection,
    pub theme: Theme,
}

/// Owns all round state and advances it one frame at a time.
#[derive(Debug)]
pub struct RoundController<S> {
    config: CrawlerConfig,
    world: GridWorld,
    player: PlayerMotion,
    chaser: ChaserAgent,
    protection: SpawnProtection,
    score: RoundScore,
    powerups: ActivePowerUps,
    theme: Theme,
    held: Option<Dir>,
    elapsed: f32,
    sink: S,
}

impl<S: EffectSink> RoundController<S> {
    pub fn new(config: CrawlerConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let score = RoundScore::default();
        let world = GridWorld::generate(&config, score.floor);
        let start = world.start();
        let chaser = ChaserAgent::new(
            world.chaser_start,
            chaser::interval_for_floor(&config.chaser, score.floor),
        );

        let mut controller = Self {
            protection: SpawnProtection::new(config.chaser.spawn_protection),
            player: PlayerMotion::new(start),
            theme: Theme::for_floor(score.floor),
            powerups: ActivePowerUps::default(),
            held: None,
            elapsed: 0.0,
            config,
            world,
            chaser,
            score,
            sink,
        };
        controller.settle_floor();
        Ok(controller)
    }

    /// Key-down: slide now when idle, otherwise queue the turn if the slot is free.
    pub fn press(&mut self, dir: Dir) -> bool {
        self.player.request(&self.world.grid, dir)
    }

    /// Raw `(dx, dy)` request; non-unit deltas are ignored.
    pub fn on_direction(&mut self, dx: isize, dy: isize) -> bool {
        Dir::from_delta(dx, dy).map_or(false, |dir| self.press(dir))
    }

    /// Direction held down this frame; starts a slide whenever the player idles.
    pub fn hold(&mut self, dir: Option<Dir>) {
        self.held = dir;
    }

    /// Drops held input, e.g. when the host loses focus.
    pub fn release_all(&mut self) {
        self.held = None;
    }

    /// Advances the round by `dt` seconds, clamped to the configured maximum.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        self.elapsed += dt;

        if !self.player.sliding {
            if let Some(dir) = self.held {
                let _ = self.player.start_slide(&self.world.grid, dir);
            }
        }

        let slide_duration = self.slide_duration();
        if let Some(cell) = self.player.advance(dt, slide_duration) {
            self.resolve_commit(cell);
        }

        if self.chaser.tick_spawn_delay(dt) {
            self.activate_chaser();
        }

        if self.protection.advance(dt) {
            debug!("spawn protection ended");
        }

        self.advance_chaser(dt);
        self.advance_hazards(dt);
        for kind in self.powerups.advance(dt) {
            debug!(?kind, "power-up expired");
        }
        self.score.advance_combo(dt);

        if self.world.pickups.is_empty() {
            self.clear_floor();
        }
    }

    pub fn snapshot(&self) -> RoundSnapshot<'_> {
        RoundSnapshot {
            grid: &self.world.grid,
            corridor: &self.world.corridor,
            player: &self.player,
            slide_duration: self.slide_duration(),
            chaser: &self.chaser,
            pickups: self.world.pickups.as_slice(),
            spikes: &self.world.spikes,
            score: self.score,
            powerups: &self.powerups,
            protection: self.protection,
            theme: self.theme,
        }
    }

    pub fn score(&self) -> RoundScore {
        self.score
    }

    pub fn floor(&self) -> u32 {
        self.score.floor
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn player(&self) -> &PlayerMotion {
        &self.player
    }

    pub fn chaser(&self) -> &ChaserAgent {
        &self.chaser
    }

    pub fn protection(&self) -> SpawnProtection {
        self.protection
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Seconds of simulated time so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Debug hook: teleports the player to a walkable cell.
    pub fn reset_player_to(&mut self, cell: Cell) -> bool {
        if !self.world.grid.is_walkable(cell) {
            return false;
        }
        self.player.reset_to(cell);
        true
    }

    /// Debug hook: reseeds layout generation from the next floor onward.
    pub fn set_seed(&mut self, seed: u32) {
        self.config.seed = seed;
        info!(seed, "seed changed");
    }

    /// Debug hook: teleports the chaser to a walkable cell.
    pub fn place_chaser(&mut self, cell: Cell) -> bool {
        if !self.world.grid.is_walkable(cell) {
            return false;
        }
        self.chaser.reset_to(cell);
        true
    }

    fn slide_duration(&self) -> f32 {
        if self.powerups.is_on(PowerUpKind::Speed) {
            self.config.slide_duration * self.config.powerups.speed_factor
        } else {
            self.config.slide_duration
        }
    }

    fn invulnerable(&self) -> bool {
        self.powerups.is_on(PowerUpKind::Invulnerable)
    }

    fn generate_floor(&mut self) {
        self.world = GridWorld::generate(&self.config, self.score.floor);
        self.settle_floor();
    }

    /// Positions entities and applies the chaser activation rule for the current floor.
    fn settle_floor(&mut self) {
        let floor = self.score.floor;
        self.player.reset_to(self.world.start());
        self.chaser.place(
            self.world.chaser_start,
            chaser::interval_for_floor(&self.config.chaser, floor),
        );
        self.score.reset_combo();
        self.theme = Theme::for_floor(floor);

        if floor >= CHASER_INTRO_FLOOR {
            self.activate_chaser();
        } else {
            self.chaser.active = false;
            if !self.chaser.has_spawned {
                self.chaser.spawn_timer = self.config.chaser.first_floor_spawn_delay;
            }
        }
    }

    fn activate_chaser(&mut self) {
        if self.chaser.activate() {
            self.protection.grant();
            self.sink.ripple(self.chaser.cell, ColorToken::Ripple);
            info!(floor = self.score.floor, cell = ?self.chaser.cell, "chaser spawned");
        }
    }

    fn resolve_commit(&mut self, cell: Cell) {
        self.collect_at(cell);

        if hazards::armed_at(&self.world.spikes, cell) && !self.invulnerable() {
            self.reset_after_hit(Hit::Trap);
            return;
        }
        let _ = self.player.continue_after_commit(&self.world.grid);
    }

    fn collect_at(&mut self, cell: Cell) {
        let radius = if self.powerups.is_on(PowerUpKind::Magnet) {
            self.config.powerups.magnet_radius
        } else {
            0
        };
        let removed = self.world.pickups.remove_where(|pickup| {
            pickup.cell == cell
                || (matches!(pickup.kind, PickupKind::Coin | PickupKind::BigCoin)
                    && pickup.cell.manhattan(cell) <= radius)
        });

        let scoring = &self.config.scoring;
        for pickup in removed {
            match pickup.kind {
                PickupKind::Coin => {
                    self.score.award(pickup.value, 1, scoring.coin_combo_window);
                    self.sink.particle_burst(pickup.cell, ColorToken::Coin, PICKUP_PARTICLES);
                    self.sink.ripple(pickup.cell, ColorToken::Coin);
                }
                PickupKind::BigCoin => {
                    self.score.award(
                        pickup.value,
                        scoring.big_coin_combo_bonus,
                        scoring.big_coin_combo_window,
                    );
                    self.sink.particle_burst(pickup.cell, ColorToken::BigCoin, PICKUP_PARTICLES);
                    self.sink.ripple(pickup.cell, ColorToken::BigCoin);
                }
                PickupKind::PowerUp(kind) => {
                    self.powerups.activate(kind, kind.duration(&self.config.powerups));
                    self.sink.ripple(pickup.cell, ColorToken::PowerUp);
                    info!(?kind, "power-up collected");
                }
            }
        }
    }

    fn advance_chaser(&mut self, dt: f32) {
        let slowed = self.powerups.is_on(PowerUpKind::SlowTime);
        let can_catch = !self.protection.on && !self.invulnerable();
        let outcome = self.chaser.advance(
            &self.world.grid,
            self.player.cell,
            dt,
            &self.config.chaser,
            slowed,
            can_catch,
        );
        if outcome == ChaserOutcome::Caught {
            self.reset_after_hit(Hit::Catch);
        }
    }

    fn advance_hazards(&mut self, dt: f32) {
        for spike in &mut self.world.spikes {
            let _ = spike.advance(dt, &self.config.spikes, &mut self.world.stream);
        }
        if hazards::armed_at(&self.world.spikes, self.player.cell) && !self.invulnerable() {
            self.reset_after_hit(Hit::Trap);
        }
    }

    fn reset_after_hit(&mut self, hit: Hit) {
        let (penalty, token) = match hit {
            Hit::Catch => (self.config.scoring.catch_penalty, ColorToken::Catch),
            Hit::Trap => (self.config.scoring.trap_penalty, ColorToken::Trap),
        };
        self.score.penalize(penalty);

        let start = self.world.start();
        self.player.reset_to(start);
        self.chaser.reset_to(start);
        self.sink.ripple(start, token);
        info!(?hit, score = self.score.score, "player reset to corridor start");
    }

    fn clear_floor(&mut self) {
        let bonus = self.config.scoring.clear_bonus.saturating_mul(self.score.combo);
        self.score.score = self.score.score.saturating_add(bonus);
        self.score.reset_combo();
        self.score.floor += 1;
        self.score.high_score = self.score.high_score.max(self.score.score);
        self.sink.ripple(self.player.cell, ColorToken::Ripple);
        info!(
            floor = self.score.floor,
            bonus,
            score = self.score.score,
            "floor cleared"
        );
        self.generate_floor();
    }
}
