//! Grid storage, single-corridor generation and breadth-first search helpers.

use std::collections::VecDeque;

use rand::seq::SliceRandom;

use crate::components::{Cell, Dir, Tile};
use crate::error::ConfigError;
use crate::rng::RandomStream;

/// Smallest grid edge the generator accepts.
pub const MIN_GRID_SIZE: usize = 5;

/// Edge length of the square grid for `floor` (1-based), rounded up to odd.
pub fn floor_size(base: usize, growth: usize, floor: u32) -> usize {
    let grown = base + (floor.max(1) as usize - 1) * growth;
    if grown % 2 == 0 {
        grown + 1
    } else {
        grown
    }
}

/// Rectangular tile grid stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![tile; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.tiles.get(cell.y).and_then(|row| row.get(cell.x)).copied()
    }

    pub fn set(&mut self, cell: Cell, tile: Tile) {
        if let Some(slot) = self.tiles.get_mut(cell.y).and_then(|row| row.get_mut(cell.x)) {
            *slot = tile;
        }
    }

    /// In bounds and open.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.tile(cell) == Some(Tile::Open)
    }

    /// Walkable cell one step from `cell` in `dir`, if any.
    pub fn walkable_step(&self, cell: Cell, dir: Dir) -> Option<Cell> {
        cell.step(dir).filter(|&next| self.is_walkable(next))
    }

    pub fn open_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Dir::ALL
            .into_iter()
            .filter_map(move |dir| self.walkable_step(cell, dir))
    }

    pub fn open_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, tile)| **tile == Tile::Open)
                .map(move |(x, _)| Cell::new(x, y))
        })
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.tiles
    }
}

/// Ordered walkable path of one floor. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corridor {
    cells: Vec<Cell>,
}

impl Corridor {
    fn from_route(cells: Vec<Cell>) -> Self {
        debug_assert!(!cells.is_empty(), "corridor route must hold the entry cell");
        debug_assert!(cells.windows(2).all(|pair| pair[0].is_adjacent(pair[1])));
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    pub fn end(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    /// Index halfway along, clamped to the last cell.
    pub fn midpoint_index(&self) -> usize {
        (self.cells.len() / 2).min(self.cells.len() - 1)
    }

    pub fn position(&self, cell: Cell) -> Option<usize> {
        self.cells.iter().position(|&c| c == cell)
    }
}

/// Generated floor geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub grid: Grid,
    pub corridor: Corridor,
}

/// Carves a low-branching maze and keeps only its longest path.
#[derive(Debug, Clone, Copy)]
pub struct CorridorGenerator {
    width: usize,
    height: usize,
}

impl CorridorGenerator {
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width < MIN_GRID_SIZE || height < MIN_GRID_SIZE || width % 2 == 0 || height % 2 == 0 {
            return Err(ConfigError::GridSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Square generator sized for `floor`; always odd and at least the minimum.
    pub fn for_floor(base: usize, growth: usize, floor: u32) -> Self {
        let size = floor_size(base.max(MIN_GRID_SIZE), growth, floor);
        Self {
            width: size,
            height: size,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bottom-centre carving origin, independent of randomness.
    pub fn entry(&self) -> Cell {
        Cell::new(self.width / 2, self.height - 2)
    }

    pub fn generate(&self, stream: &mut RandomStream) -> Layout {
        let carved = self.carve(stream);
        let entry = self.entry();

        let route_a = farthest_route(&carved, entry);
        let far_a = route_a.last().copied().unwrap_or(entry);
        let route_b = farthest_route(&carved, far_a);
        let corridor = Corridor::from_route(route_b);

        let mut grid = Grid::filled(self.width, self.height, Tile::Wall);
        for &cell in corridor.cells() {
            grid.set(cell, Tile::Open);
        }

        Layout { grid, corridor }
    }

    fn carve(&self, stream: &mut RandomStream) -> Grid {
        let mut grid = Grid::filled(self.width, self.height, Tile::Wall);
        let entry = self.entry();
        grid.set(entry, Tile::Open);
        let mut stack = vec![entry];

        while let Some(&current) = stack.last() {
            let mut dirs = Dir::ALL;
            dirs.shuffle(stream);
            let choice = dirs
                .into_iter()
                .find_map(|dir| self.carve_candidate(&grid, current, dir));

            match choice {
                Some((mid, dest)) => {
                    grid.set(mid, Tile::Open);
                    grid.set(dest, Tile::Open);
                    stack.push(dest);
                }
                None => {
                    let _ = stack.pop();
                }
            }
        }
        grid
    }

    fn carve_candidate(&self, grid: &Grid, current: Cell, dir: Dir) -> Option<(Cell, Cell)> {
        let mid = current.step(dir)?;
        let dest = mid.step(dir)?;
        if dest.x == 0 || dest.y == 0 || dest.x >= self.width - 1 || dest.y >= self.height - 1 {
            return None;
        }
        if grid.tile(mid) != Some(Tile::Wall) || grid.tile(dest) != Some(Tile::Wall) {
            return None;
        }
        // Keeps the carved region tree shaped.
        if grid.open_neighbors(dest).count() > 1 {
            return None;
        }
        Some((mid, dest))
    }
}

/// Route from `start` to the cell a breadth-first search reaches last.
pub fn farthest_route(grid: &Grid, start: Cell) -> Vec<Cell> {
    let mut parent: Vec<Vec<Option<Cell>>> = vec![vec![None; grid.width()]; grid.height()];
    let mut seen = vec![vec![false; grid.width()]; grid.height()];
    let mut queue = VecDeque::new();
    let mut last = start;

    if start.x < grid.width() && start.y < grid.height() {
        seen[start.y][start.x] = true;
        queue.push_back(start);
    }

    while let Some(cell) = queue.pop_front() {
        last = cell;
        for next in grid.open_neighbors(cell) {
            if !seen[next.y][next.x] {
                seen[next.y][next.x] = true;
                parent[next.y][next.x] = Some(cell);
                queue.push_back(next);
            }
        }
    }

    let mut route = vec![last];
    let mut cursor = last;
    while let Some(prev) = parent[cursor.y][cursor.x] {
        route.push(prev);
        cursor = prev;
    }
    route.reverse();
    route
}

/// Shortest walkable path from `from` to `to`, excluding `from`.
///
/// Returns `None` when either end is blocked, the ends coincide, or no route
/// exists.
pub fn shortest_path(grid: &Grid, from: Cell, to: Cell) -> Option<Vec<Cell>> {
    if from == to || !grid.is_walkable(from) || !grid.is_walkable(to) {
        return None;
    }

    let mut parent: Vec<Vec<Option<Cell>>> = vec![vec![None; grid.width()]; grid.height()];
    let mut seen = vec![vec![false; grid.width()]; grid.height()];
    let mut queue = VecDeque::new();
    seen[from.y][from.x] = true;
    queue.push_back(from);

    while let Some(cell) = queue.pop_front() {
        if cell == to {
            break;
        }
        for next in grid.open_neighbors(cell) {
            if !seen[next.y][next.x] {
                seen[next.y][next.x] = true;
                parent[next.y][next.x] = Some(cell);
                queue.push_back(next);
            }
        }
    }

    if !seen[to.y][to.x] {
        return None;
    }

    let mut path = Vec::new();
    let mut cursor = to;
    while cursor != from {
        path.push(cursor);
        cursor = parent[cursor.y][cursor.x]?;
    }
    path.reverse();
    Some(path)
}
