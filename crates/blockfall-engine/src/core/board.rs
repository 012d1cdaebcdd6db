use serde::{Deserialize, Serialize};

use crate::CellIndexError;

use super::{
    HIDDEN_ROWS,
    piece::{Piece, PieceKind},
};

/// A single cell of the playfield.
///
/// Occupied cells remember the kind of the piece that locked into them so the
/// renderer can color them; collision logic only cares about emptiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// The playfield: a fixed-size grid of [`Cell`]s.
///
/// The grid is `width` columns by `height + HIDDEN_ROWS` rows, row-major,
/// row 0 at the top. The [`HIDDEN_ROWS`] buffer rows above the visible field
/// give pieces room to spawn and to be kicked upward near the ceiling.
///
/// Dimensions never change after construction, and cell occupancy changes
/// only through [`Board::commit`] and [`Board::clear_full_rows`]. Collision
/// tests use the two-phase [`Board::can_place`] / [`Board::commit`] pair:
/// `commit` does not re-check, callers must have tested the same placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

impl Board {
    /// Creates an empty board with the given visible dimensions.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let rows = vec![vec![Cell::Empty; width]; height + HIDDEN_ROWS];
        Self {
            width,
            height,
            rows,
        }
    }

    /// Visible width in columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Visible height in rows, excluding the hidden buffer.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total row count including the hidden buffer rows.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.height + HIDDEN_ROWS
    }

    /// Returns the cell at the given position.
    ///
    /// Out-of-range indices are a caller bug, surfaced as [`CellIndexError`]
    /// rather than a silent default. Rotation probes that may leave the grid
    /// go through [`Board::can_place`] instead, which tolerates them.
    pub fn cell(&self, col: usize, row: usize) -> Result<Cell, CellIndexError> {
        if col >= self.width || row >= self.total_rows() {
            return Err(CellIndexError { col, row });
        }
        Ok(self.rows[row][col])
    }

    /// Checks whether every cell of the piece is in-bounds and empty.
    ///
    /// Kick tests routinely probe positions with negative or overflowing
    /// coordinates; those simply fail the placement.
    #[must_use]
    #[expect(clippy::cast_sign_loss)]
    pub fn can_place(&self, piece: &Piece) -> bool {
        piece.cells().all(|(col, row)| {
            col >= 0
                && (col as usize) < self.width
                && row >= 0
                && (row as usize) < self.total_rows()
                && self.rows[row as usize][col as usize].is_empty()
        })
    }

    /// Locks the piece's cells into the grid with its kind.
    ///
    /// The caller guarantees [`Board::can_place`] held for this exact
    /// placement immediately before.
    #[expect(clippy::cast_sign_loss)]
    pub fn commit(&mut self, piece: &Piece) {
        for (col, row) in piece.cells() {
            self.rows[row as usize][col as usize] = Cell::Occupied(piece.kind());
        }
    }

    /// Removes every full row and shifts the rows above down.
    ///
    /// Returns the cleared row indices ordered top-to-bottom. One pass
    /// handles any simultaneous count (0 through 4 and beyond); the rows
    /// exposed at the top come back empty.
    pub fn clear_full_rows(&mut self) -> Vec<usize> {
        let total = self.total_rows();
        let mut cleared = Vec::new();

        for row in (0..total).rev() {
            if self.is_row_full(row) {
                cleared.push(row);
                continue;
            }
            if !cleared.is_empty() {
                self.rows[row + cleared.len()] = self.rows[row].clone();
            }
        }

        for row in &mut self.rows[..cleared.len()] {
            row.fill(Cell::Empty);
        }
        cleared.reverse();
        cleared
    }

    /// True when every cell of the row is occupied.
    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows[row].iter().all(|cell| !cell.is_empty())
    }

    /// Stack height of a column: distance from its topmost occupied cell to
    /// the floor, or 0 for an empty column.
    #[must_use]
    pub fn column_height(&self, col: usize) -> usize {
        self.rows
            .iter()
            .position(|row| !row[col].is_empty())
            .map_or(0, |top| self.total_rows() - top)
    }

    /// Iterates over the visible rows, top to bottom.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows[HIDDEN_ROWS..].iter().map(Vec::as_slice)
    }

    /// Builds a board from ASCII art for tests: `#` occupied, `.` empty.
    ///
    /// Each line is one visible row, top to bottom; width is taken from the
    /// first line. The hidden buffer rows start empty.
    ///
    /// # Panics
    ///
    /// Panics if the art is empty or a line's width differs from the first.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(!lines.is_empty(), "board art must contain at least one row");

        let width = lines[0].chars().count();
        let mut board = Self::new(width, lines.len());
        for (y, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().collect();
            assert_eq!(
                cells.len(),
                width,
                "row {y} has {} cells, expected {width}",
                cells.len(),
            );
            for (x, &ch) in cells.iter().enumerate() {
                if ch == '#' {
                    board.rows[y + HIDDEN_ROWS][x] = Cell::Occupied(PieceKind::I);
                }
            }
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::{Piece, Rotation};

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(10, 20);
        assert_eq!(board.width(), 10);
        assert_eq!(board.height(), 20);
        assert_eq!(board.total_rows(), 20 + HIDDEN_ROWS);
        for row in 0..board.total_rows() {
            for col in 0..board.width() {
                assert_eq!(board.cell(col, row).unwrap(), Cell::Empty);
            }
        }
    }

    #[test]
    fn test_cell_out_of_range_is_an_error() {
        let board = Board::new(10, 20);
        assert!(board.cell(10, 0).is_err());
        assert!(board.cell(0, 22).is_err());
        assert!(board.cell(9, 21).is_ok());
    }

    #[test]
    fn test_can_place_rejects_out_of_bounds_probes() {
        let board = Board::new(10, 20);

        // In the open field.
        let piece = Piece::new(PieceKind::T, Rotation::SPAWN, 3, 5);
        assert!(board.can_place(&piece));

        // Poking through the left wall, the right wall, and the floor.
        assert!(!board.can_place(&Piece::new(PieceKind::T, Rotation::SPAWN, -1, 5)));
        assert!(!board.can_place(&Piece::new(PieceKind::T, Rotation::SPAWN, 8, 5)));
        assert!(!board.can_place(&Piece::new(PieceKind::T, Rotation::SPAWN, 3, 21)));
    }

    #[test]
    fn test_commit_marks_cells_with_kind() {
        let mut board = Board::new(10, 20);
        let piece = Piece::new(PieceKind::J, Rotation::SPAWN, 0, 0);
        assert!(board.can_place(&piece));
        board.commit(&piece);

        let mut occupied = 0;
        for row in 0..board.total_rows() {
            for col in 0..board.width() {
                if let Cell::Occupied(kind) = board.cell(col, row).unwrap() {
                    assert_eq!(kind, PieceKind::J);
                    occupied += 1;
                }
            }
        }
        assert_eq!(occupied, 4);
    }

    #[test]
    fn test_clear_full_rows_noop_without_full_rows() {
        let mut board = Board::from_ascii(
            r"
            ..........
            .#........
            ..#.......
            #########.
            ",
        );
        let before = board.clone();
        assert!(board.clear_full_rows().is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_full_rows_single() {
        let mut board = Board::from_ascii(
            r"
            ..........
            .##.......
            ##########
            ..#.......
            ",
        );
        let cleared = board.clear_full_rows();
        assert_eq!(cleared, vec![2 + HIDDEN_ROWS]);
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                ..........
                ..........
                .##.......
                ..#.......
                ",
            )
        );
    }

    #[test]
    fn test_clear_full_rows_preserves_partial_rows_in_order() {
        let mut board = Board::from_ascii(
            r"
            .#........
            ##########
            ..#.......
            ##########
            ...#......
            ",
        );
        let cleared = board.clear_full_rows();
        assert_eq!(cleared, vec![1 + HIDDEN_ROWS, 3 + HIDDEN_ROWS]);
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                ..........
                ..........
                .#........
                ..#.......
                ...#......
                ",
            )
        );
    }

    #[test]
    fn test_clear_full_rows_tetris() {
        let mut board = Board::from_ascii(
            r"
            .#........
            ##########
            ##########
            ##########
            ##########
            ",
        );
        let cleared = board.clear_full_rows();
        assert_eq!(cleared.len(), 4);
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                ..........
                ..........
                ..........
                ..........
                .#........
                ",
            )
        );
    }

    #[test]
    fn test_is_row_full_and_column_height() {
        let board = Board::from_ascii(
            r"
            ..........
            ..........
            #.........
            ##########
            ",
        );
        assert!(board.is_row_full(3 + HIDDEN_ROWS));
        assert!(!board.is_row_full(2 + HIDDEN_ROWS));
        assert_eq!(board.column_height(0), 2);
        assert_eq!(board.column_height(5), 1);
    }

    #[test]
    fn test_column_height_empty_column() {
        let board = Board::new(10, 20);
        assert_eq!(board.column_height(4), 0);
    }
}
