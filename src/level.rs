use std::f32::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::components::Cell;
use crate::config::CrawlerConfig;
use crate::hazards::{self, SpikeTrap};
use crate::maze::{Corridor, CorridorGenerator, Grid, Layout};
use crate::powerups::PowerUpKind;
use crate::rng::RandomStream;

/// Corridor cells at the entry that never receive a spike.
const SPIKE_FREE_PREFIX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PickupId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Coin,
    BigCoin,
    PowerUp(PowerUpKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub id: PickupId,
    pub cell: Cell,
    pub kind: PickupKind,
    pub value: u32,
    /// Cosmetic animation phase in radians.
    pub shimmer: f32,
}

/// Pickups of one floor, keyed by stable id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pickups {
    items: Vec<Pickup>,
    next_id: u32,
}

impl Pickups {
    pub fn insert(&mut self, cell: Cell, kind: PickupKind, value: u32, shimmer: f32) -> PickupId {
        let id = PickupId(self.next_id);
        self.next_id += 1;
        self.items.push(Pickup {
            id,
            cell,
            kind,
            value,
            shimmer,
        });
        id
    }

    /// Removes every pickup matching `predicate` and hands them back.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<Pickup>
    where
        F: FnMut(&Pickup) -> bool,
    {
        let (removed, kept): (Vec<Pickup>, Vec<Pickup>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|pickup| predicate(pickup));
        self.items = kept;
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pickup> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Pickup] {
        &self.items
    }

    pub fn at(&self, cell: Cell) -> Option<&Pickup> {
        self.items.iter().find(|pickup| pickup.cell == cell)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Everything generated for a single floor.
#[derive(Debug, Clone)]
pub struct GridWorld {
    pub floor: u32,
    pub grid: Grid,
    pub corridor: Corridor,
    pub pickups: Pickups,
    pub spikes: Vec<SpikeTrap>,
    pub chaser_start: Cell,
    /// Floor stream, continued after layout for hazard timings.
    pub stream: RandomStream,
}

impl GridWorld {
    pub fn generate(config: &CrawlerConfig, floor: u32) -> Self {
        let generator =
            CorridorGenerator::for_floor(config.base_grid_size, config.growth_per_floor, floor);
        let mut stream = RandomStream::for_floor(config.seed, floor);
        let Layout { grid, corridor } = generator.generate(&mut stream);

        let mut world = Self {
            floor,
            chaser_start: corridor
                .get(corridor.midpoint_index())
                .unwrap_or_else(|| corridor.start()),
            grid,
            corridor,
            pickups: Pickups::default(),
            spikes: Vec::new(),
            stream,
        };
        world.place_coins(config);
        if floor >= config.powerups.first_floor {
            world.place_power_up();
        }
        if floor >= config.spikes.first_floor {
            world.place_spikes(config);
        }

        debug!(
            floor,
            width = generator.width(),
            height = generator.height(),
            corridor = world.corridor.len(),
            pickups = world.pickups.len(),
            spikes = world.spikes.len(),
            "generated floor"
        );
        world
    }

    pub fn start(&self) -> Cell {
        self.corridor.start()
    }

    fn place_coins(&mut self, config: &CrawlerConfig) {
        let scoring = &config.scoring;
        let mut placed = 0;
        for index in (1..self.corridor.len()).step_by(scoring.coin_stride) {
            let Some(cell) = self.corridor.get(index) else {
                break;
            };
            placed += 1;
            let shimmer = self.stream.gen_range(0.0..TAU);
            if placed % scoring.big_coin_every == 0 {
                let _ = self
                    .pickups
                    .insert(cell, PickupKind::BigCoin, scoring.big_coin_value, shimmer);
            } else {
                let _ = self
                    .pickups
                    .insert(cell, PickupKind::Coin, scoring.coin_value, shimmer);
            }
        }
    }

    fn place_power_up(&mut self) {
        let candidates: Vec<usize> = (self.corridor.len() / 2..self.corridor.len())
            .filter(|&index| index > 0 && self.is_free(index))
            .collect();
        let Some(&index) = candidates.choose(&mut self.stream) else {
            return;
        };
        let Some(&kind) = PowerUpKind::ALL.choose(&mut self.stream) else {
            return;
        };
        let shimmer = self.stream.gen_range(0.0..TAU);
        if let Some(cell) = self.corridor.get(index) {
            let _ = self.pickups.insert(cell, PickupKind::PowerUp(kind), 0, shimmer);
        }
    }

    fn place_spikes(&mut self, config: &CrawlerConfig) {
        let wanted = ((self.floor - config.spikes.first_floor + 1) as usize)
            .min(config.spikes.max_spikes);
        let mut candidates: Vec<usize> = (SPIKE_FREE_PREFIX..self.corridor.len())
            .filter(|&index| self.is_free(index))
            .collect();
        candidates.shuffle(&mut self.stream);

        for index in candidates.into_iter().take(wanted) {
            if let Some(cell) = self.corridor.get(index) {
                let dormant = hazards::roll_dormant(&config.spikes, &mut self.stream);
                self.spikes.push(SpikeTrap::new(cell, dormant));
            }
        }
    }

    fn is_free(&self, index: usize) -> bool {
        self.corridor.get(index).map_or(false, |cell| {
            self.pickups.at(cell).is_none() && self.spikes.iter().all(|spike| spike.cell != cell)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coins_follow_the_stride_and_every_sixth_is_big() {
        let config = CrawlerConfig::default();
        let world = GridWorld::generate(&config, 1);
        let coins: Vec<&Pickup> = world.pickups.iter().collect();

        assert!(!coins.is_empty());
        for (placed, pickup) in coins.iter().enumerate() {
            let index = world.corridor.position(pickup.cell).expect("on corridor");
            assert_eq!(index, 1 + placed * 3);
            if (placed + 1) % 6 == 0 {
                assert_eq!(pickup.kind, PickupKind::BigCoin);
                assert_eq!(pickup.value, 50);
            } else {
                assert_eq!(pickup.kind, PickupKind::Coin);
                assert_eq!(pickup.value, 10);
            }
            assert!((0.0..TAU).contains(&pickup.shimmer));
        }
    }

    #[test]
    fn floor_one_has_no_spikes_or_power_ups() {
        let world = GridWorld::generate(&CrawlerConfig::default(), 1);
        assert!(world.spikes.is_empty());
        assert!(world
            .pickups
            .iter()
            .all(|p| !matches!(p.kind, PickupKind::PowerUp(_))));
    }

    #[test]
    fn later_floors_add_spikes_and_a_power_up_on_free_cells() {
        let world = GridWorld::generate(&CrawlerConfig::default(), 4);
        assert_eq!(world.spikes.len(), 3);
        let power_ups = world
            .pickups
            .iter()
            .filter(|p| matches!(p.kind, PickupKind::PowerUp(_)))
            .count();
        assert_eq!(power_ups, 1);

        for spike in &world.spikes {
            let index = world.corridor.position(spike.cell).expect("on corridor");
            assert!(index >= SPIKE_FREE_PREFIX);
            assert!(world.pickups.at(spike.cell).is_none());
        }
    }

    #[test]
    fn chaser_starts_halfway_along() {
        let world = GridWorld::generate(&CrawlerConfig::default(), 2);
        let mid = world.corridor.len() / 2;
        assert_eq!(Some(world.chaser_start), world.corridor.get(mid));
    }

    #[test]
    fn remove_where_returns_the_removed_entries() {
        let mut pickups = Pickups::default();
        let a = pickups.insert(Cell::new(1, 1), PickupKind::Coin, 10, 0.0);
        let _ = pickups.insert(Cell::new(1, 2), PickupKind::BigCoin, 50, 0.0);
        let removed = pickups.remove_where(|p| p.cell == Cell::new(1, 1));

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, a);
        assert_eq!(pickups.len(), 1);
        assert_eq!(pickups.as_slice()[0].kind, PickupKind::BigCoin);
        assert!(pickups.remove_where(|_| false).is_empty());
    }
}
