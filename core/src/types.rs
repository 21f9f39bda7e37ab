/// Single grid axis, used for row and column counts.
pub type Coord = u8;

/// Count type used for card and pair counts.
pub type CardCount = u16;

/// `(rows, cols)` of a board.
pub type GridSize = (Coord, Coord);

/// `(row, col)` of a cell.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CardCount {
    let a = a as CardCount;
    let b = b as CardCount;
    a.saturating_mul(b)
}

/// Row-major conversion from a flat cell index to `(row, col)`.
pub const fn index_to_coords(index: usize, size: GridSize) -> Option<Coord2> {
    let (rows, cols) = size;
    let (rows, cols) = (rows as usize, cols as usize);
    if cols == 0 || index >= rows * cols {
        return None;
    }
    Some(((index / cols) as Coord, (index % cols) as Coord))
}

pub const fn coords_to_index(coords: Coord2, size: GridSize) -> usize {
    coords.0 as usize * size.1 as usize + coords.1 as usize
}

/// Cardinal step on the grid, used by the controller cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Moves `index` one cell in this direction, `None` when that would leave the grid.
    ///
    /// Horizontal steps never wrap to the neighbouring row.
    pub fn step(self, index: usize, size: GridSize) -> Option<usize> {
        let (row, col) = index_to_coords(index, size)?;
        let (rows, cols) = size;

        let next = match self {
            Self::Up => (row.checked_sub(1)?, col),
            Self::Down if row + 1 < rows => (row + 1, col),
            Self::Left => (row, col.checked_sub(1)?),
            Self::Right if col + 1 < cols => (row, col + 1),
            Self::Down | Self::Right => return None,
        };

        Some(coords_to_index(next, size))
    }
}
