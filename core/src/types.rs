/// Single coordinate axis used for grid row and column counts.
pub type Coord = u8;

/// Count type used for card counts and pair counts.
pub type CardCount = u16;

/// Identity shared by exactly two cards of a complete grid.
pub type PairId = u16;

/// Linear row-major position of a card within the grid.
pub type CardIndex = usize;

/// Grid dimensions as `(rows, columns)`.
pub type GridSize = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for GridSize {
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

/// Human-readable form of a grid size, e.g. `"3x4"`.
pub fn grid_size_text((rows, cols): GridSize) -> String {
    format!("{}x{}", rows, cols)
}
