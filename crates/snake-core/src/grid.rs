//! Play field geometry

/// One tile of the play field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step in `direction`
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Movement direction. Screen coordinates: `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Square grid of `tile_count` x `tile_count` tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    tile_count: i32,
}

impl Grid {
    pub fn new(tile_count: u16) -> Self {
        Self {
            tile_count: i32::from(tile_count),
        }
    }

    pub fn tile_count(&self) -> i32 {
        self.tile_count
    }

    /// Total number of tiles
    pub fn area(&self) -> usize {
        // 65535² still fits a 32-bit usize
        let n = self.tile_count as usize;
        n * n
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.tile_count).contains(&cell.x) && (0..self.tile_count).contains(&cell.y)
    }

    /// All tiles, row by row
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.tile_count).flat_map(move |y| (0..self.tile_count).map(move |x| Cell::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step() {
        let c = Cell::new(10, 10);
        assert_eq!(c.step(Direction::Up), Cell::new(10, 9));
        assert_eq!(c.step(Direction::Down), Cell::new(10, 11));
        assert_eq!(c.step(Direction::Left), Cell::new(9, 10));
        assert_eq!(c.step(Direction::Right), Cell::new(11, 10));
    }

    #[test]
    fn test_opposite() {
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_ne!(dir, dir.opposite());
            assert_eq!(dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn test_grid_bounds() {
        let grid = Grid::new(20);
        assert!(grid.contains(Cell::new(0, 0)));
        assert!(grid.contains(Cell::new(19, 19)));
        assert!(!grid.contains(Cell::new(-1, 5)));
        assert!(!grid.contains(Cell::new(5, 20)));
        assert_eq!(grid.cells().count(), grid.area());
    }

    #[test]
    fn test_area_of_largest_grid() {
        let grid = Grid::new(u16::MAX);
        assert_eq!(grid.area(), 65_535 * 65_535);
        assert!(grid.contains(Cell::new(65_534, 65_534)));
    }
}
