//! Slide-based player movement with a one-slot direction queue.

use crate::components::{Cell, Dir};
use crate::maze::Grid;

/// Tile-to-tile sliding state of the player.
///
/// While `sliding` is set, `to` is a walkable cell adjacent to `from`. A
/// slide commits once its timer reaches the slide duration; the player then
/// either takes the queued turn, keeps going in the same direction, or stops.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMotion {
    pub cell: Cell,
    pub from: Cell,
    pub to: Cell,
    pub timer: f32,
    pub sliding: bool,
    pub dir: Option<Dir>,
    pub queued: Option<Dir>,
}

/// What happened after a slide committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterCommit {
    /// Took the queued direction.
    Turned(Dir),
    /// Kept the previous direction.
    Continued(Dir),
    Stopped,
}

impl PlayerMotion {
    pub fn new(cell: Cell) -> Self {
        Self {
            cell,
            from: cell,
            to: cell,
            timer: 0.0,
            sliding: false,
            dir: None,
            queued: None,
        }
    }

    /// Begins a slide toward the neighbouring cell in `dir`.
    ///
    /// Fails without changing state if already sliding or the target is not
    /// walkable.
    pub fn start_slide(&mut self, grid: &Grid, dir: Dir) -> bool {
        if self.sliding {
            return false;
        }
        let Some(target) = grid.walkable_step(self.cell, dir) else {
            return false;
        };
        self.sliding = true;
        self.dir = Some(dir);
        self.from = self.cell;
        self.to = target;
        self.timer = 0.0;
        true
    }

    /// Key-down handling: slide now when idle, otherwise fill the empty queue slot.
    pub fn request(&mut self, grid: &Grid, dir: Dir) -> bool {
        if self.sliding {
            if self.queued.is_none() {
                self.queued = Some(dir);
            }
            false
        } else {
            self.start_slide(grid, dir)
        }
    }

    /// Accumulates `dt` and returns the committed cell once the slide finishes.
    pub fn advance(&mut self, dt: f32, slide_duration: f32) -> Option<Cell> {
        if !self.sliding {
            return None;
        }
        self.timer += dt;
        if self.timer > slide_duration * 3.0 {
            self.timer = slide_duration;
        }
        if self.progress(slide_duration) < 1.0 {
            return None;
        }
        self.cell = self.to;
        self.timer = 0.0;
        Some(self.cell)
    }

    /// Chains the next slide after a commit: queued turn first, then straight on.
    pub fn continue_after_commit(&mut self, grid: &Grid) -> AfterCommit {
        if let Some(queued) = self.queued.take() {
            if let Some(target) = grid.walkable_step(self.cell, queued) {
                self.from = self.cell;
                self.to = target;
                self.dir = Some(queued);
                return AfterCommit::Turned(queued);
            }
        }

        if let Some(dir) = self.dir {
            if let Some(target) = grid.walkable_step(self.cell, dir) {
                self.from = self.cell;
                self.to = target;
                return AfterCommit::Continued(dir);
            }
        }

        self.stop();
        AfterCommit::Stopped
    }

    pub fn stop(&mut self) {
        self.sliding = false;
        self.dir = None;
        self.timer = 0.0;
        self.from = self.cell;
        self.to = self.cell;
    }

    /// Teleports to `cell`, dropping any slide and queued turn.
    pub fn reset_to(&mut self, cell: Cell) {
        self.cell = cell;
        self.queued = None;
        self.stop();
    }

    /// Slide completion in `[0, 1]`.
    pub fn progress(&self, slide_duration: f32) -> f32 {
        (self.timer / slide_duration.max(0.0001)).min(1.0)
    }

    /// Interpolated position in tile units, for renderers.
    pub fn position(&self, slide_duration: f32) -> (f32, f32) {
        let t = if self.sliding {
            self.progress(slide_duration)
        } else {
            0.0
        };
        let lerp = |a: usize, b: usize| a as f32 + (b as f32 - a as f32) * t;
        (lerp(self.from.x, self.to.x), lerp(self.from.y, self.to.y))
    }
}
