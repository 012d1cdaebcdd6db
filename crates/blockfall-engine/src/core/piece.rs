use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::board::Board;

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        match rng.random_range(0..=6) {
            0 => PieceKind::I,
            1 => PieceKind::O,
            2 => PieceKind::T,
            3 => PieceKind::S,
            4 => PieceKind::Z,
            5 => PieceKind::J,
            _ => PieceKind::L,
        }
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece types, one of each (a single bag).
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Side length of the bounding box the piece rotates within.
    #[must_use]
    pub const fn box_size(self) -> usize {
        match self {
            PieceKind::I => 4,
            PieceKind::O => 2,
            _ => 3,
        }
    }

    /// Occupied offsets within the bounding box for the given rotation,
    /// as `(col, row)` pairs with row increasing downward.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn cells(self, rotation: Rotation) -> impl Iterator<Item = (i8, i8)> {
        let grid = SHAPES[self as usize][rotation.as_usize()];
        (0..BOX_CELLS).flat_map(move |row| {
            (0..BOX_CELLS)
                .filter(move |&col| grid[row][col])
                .map(move |col| (col as i8, row as i8))
        })
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Rotation state of a piece.
///
/// One of four states: 0 (spawn), then 90, 180, and 270 degrees clockwise.
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        Rotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_ccw(self) -> Self {
        Rotation((self.0 + 3) % 4)
    }

    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => self.rotated_cw(),
            RotationDirection::CounterClockwise => self.rotated_ccw(),
        }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    pub(crate) const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Direction of a rotation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// A piece at a specific location and orientation on the board.
///
/// Pieces are immutable: movement and rotation operations return new `Piece`
/// values, which the caller validates against the board before adopting.
/// The origin is the top-left corner of the piece's bounding box in board
/// coordinates; it goes negative when the box hangs over the left wall or
/// above the buffer while occupied cells stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    kind: PieceKind,
    rotation: Rotation,
    col: i16,
    row: i16,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: Rotation, col: i16, row: i16) -> Self {
        Self {
            kind,
            rotation,
            col,
            row,
        }
    }

    /// Creates a piece at its spawn placement: spawn rotation, horizontally
    /// centered, bounding box at the top of the hidden buffer.
    #[must_use]
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let col = ((board_width.saturating_sub(kind.box_size())) / 2) as i16;
        Self::new(kind, Rotation::SPAWN, col, 0)
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub const fn col(&self) -> i16 {
        self.col
    }

    #[must_use]
    pub const fn row(&self) -> i16 {
        self.row
    }

    /// Absolute board coordinates of the piece's occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        let (col, row) = (self.col, self.row);
        self.kind
            .cells(self.rotation)
            .map(move |(dc, dr)| (col + i16::from(dc), row + i16::from(dr)))
    }

    #[must_use]
    pub const fn shifted(&self, dcol: i16, drow: i16) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation,
            col: self.col + dcol,
            row: self.row + drow,
        }
    }

    #[must_use]
    pub const fn left(&self) -> Self {
        self.shifted(-1, 0)
    }

    #[must_use]
    pub const fn right(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub const fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    /// The same piece turned one step without any kick applied.
    #[must_use]
    pub const fn rotated(&self, direction: RotationDirection) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation.rotated(direction),
            col: self.col,
            row: self.row,
        }
    }

    /// Where the piece would come to rest if dropped straight down.
    #[must_use]
    pub fn drop_projection(&self, board: &Board) -> Self {
        let mut dropped = *self;
        loop {
            let next = dropped.down();
            if !board.can_place(&next) {
                return dropped;
            }
            dropped = next;
        }
    }
}

const BOX_CELLS: usize = 4;

/// Piece shape as a 4×4 occupancy grid; smaller pieces use the top-left
/// `box_size × box_size` corner.
type ShapeGrid = [[bool; BOX_CELLS]; BOX_CELLS];

/// Generates all 4 rotation states of a shape by rotating 90° clockwise
/// within its bounding box.
const fn grid_rotations(size: usize, grid: ShapeGrid) -> [ShapeGrid; 4] {
    let mut rotations = [grid; 4];
    let mut i = 1;
    while i < 4 {
        let mut rotated = [[false; BOX_CELLS]; BOX_CELLS];
        let mut row = 0;
        while row < size {
            let mut col = 0;
            while col < size {
                rotated[row][col] = rotations[i - 1][size - 1 - col][row];
                col += 1;
            }
            row += 1;
        }
        rotations[i] = rotated;
        i += 1;
    }
    rotations
}

const SHAPES: [[ShapeGrid; 4]; PieceKind::LEN] = {
    const X: bool = true;
    const E: bool = false;
    const EMPTY: [bool; 4] = [E; 4];

    [
        // I-piece
        grid_rotations(4, [EMPTY, [X, X, X, X], EMPTY, EMPTY]),
        // O-piece
        grid_rotations(2, [[X, X, E, E], [X, X, E, E], EMPTY, EMPTY]),
        // T-piece
        grid_rotations(3, [[E, X, E, E], [X, X, X, E], EMPTY, EMPTY]),
        // S-piece
        grid_rotations(3, [[E, X, X, E], [X, X, E, E], EMPTY, EMPTY]),
        // Z-piece
        grid_rotations(3, [[X, X, E, E], [E, X, X, E], EMPTY, EMPTY]),
        // J-piece
        grid_rotations(3, [[X, E, E, E], [X, X, X, E], EMPTY, EMPTY]),
        // L-piece
        grid_rotations(3, [[E, E, X, E], [X, X, X, E], EMPTY, EMPTY]),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceKind::ALL {
            let mut rotation = Rotation::SPAWN;
            for _ in 0..4 {
                assert_eq!(
                    kind.cells(rotation).count(),
                    4,
                    "{kind:?} at rotation {} must occupy 4 cells",
                    rotation.index(),
                );
                rotation = rotation.rotated_cw();
            }
        }
    }

    #[test]
    fn test_rotation_wraps_around() {
        let rotation = Rotation::SPAWN;
        assert_eq!(
            rotation
                .rotated_cw()
                .rotated_cw()
                .rotated_cw()
                .rotated_cw(),
            rotation
        );
        assert_eq!(rotation.rotated_ccw().rotated_cw(), rotation);
        assert_eq!(rotation.rotated_ccw().index(), 3);
    }

    #[test]
    fn test_o_piece_rotation_is_identity() {
        let spawn: Vec<_> = PieceKind::O.cells(Rotation::SPAWN).collect();
        let mut rotation = Rotation::SPAWN;
        for _ in 0..3 {
            rotation = rotation.rotated_cw();
            let cells: Vec<_> = PieceKind::O.cells(rotation).collect();
            assert_eq!(cells, spawn);
        }
    }

    #[test]
    fn test_i_piece_turns_vertical() {
        let cells: Vec<_> = PieceKind::I.cells(Rotation::SPAWN.rotated_cw()).collect();
        assert_eq!(cells, vec![(2, 0), (2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_spawn_is_centered_and_placeable() {
        let board = Board::new(10, 20);
        for kind in PieceKind::ALL {
            let piece = Piece::spawn(kind, board.width());
            assert!(board.can_place(&piece), "{kind:?} must fit at spawn");
            for (col, _) in piece.cells() {
                assert!((3..=6).contains(&col), "{kind:?} spawns off-center");
            }
        }
    }

    #[test]
    fn test_drop_projection_rests_on_floor() {
        let board = Board::new(10, 20);
        let piece = Piece::spawn(PieceKind::O, board.width());
        let dropped = piece.drop_projection(&board);
        let bottom = dropped.cells().map(|(_, row)| row).max().unwrap();
        assert_eq!(bottom as usize, board.total_rows() - 1);
        assert!(!board.can_place(&dropped.down()));
    }

    #[test]
    fn test_char_roundtrip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
    }
}
