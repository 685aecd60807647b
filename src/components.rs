/// State of a single grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Open,
}

/// Grid coordinate, column `x` and row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Neighbour one tile away in `dir`, or `None` when it would underflow.
    pub fn step(self, dir: Dir) -> Option<Cell> {
        let (dx, dy) = dir.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Cell { x, y })
    }

    pub fn manhattan(self, other: Cell) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan(other) == 1
    }

    /// Direction leading from `self` to an adjacent `other`.
    pub fn dir_to(self, other: Cell) -> Option<Dir> {
        Dir::ALL
            .into_iter()
            .find(|&dir| self.step(dir) == Some(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    /// Unit delta back to a direction; anything else is `None`.
    pub fn from_delta(dx: isize, dy: isize) -> Option<Dir> {
        Dir::ALL.into_iter().find(|dir| dir.delta() == (dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_refuses_to_underflow() {
        let origin = Cell::new(0, 0);
        assert_eq!(origin.step(Dir::Up), None);
        assert_eq!(origin.step(Dir::Left), None);
        assert_eq!(origin.step(Dir::Right), Some(Cell::new(1, 0)));
        assert_eq!(origin.step(Dir::Down), Some(Cell::new(0, 1)));
    }

    #[test]
    fn dir_to_finds_adjacent_direction() {
        let a = Cell::new(3, 3);
        assert_eq!(a.dir_to(Cell::new(3, 2)), Some(Dir::Up));
        assert_eq!(a.dir_to(Cell::new(4, 3)), Some(Dir::Right));
        assert_eq!(a.dir_to(Cell::new(5, 3)), None);
        assert_eq!(Dir::from_delta(0, -1), Some(Dir::Up));
        assert_eq!(Dir::from_delta(1, 1), None);
    }
}
