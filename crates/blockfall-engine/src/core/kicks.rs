use crate::RotationRejected;

use super::{
    board::Board,
    piece::{Piece, PieceKind, RotationDirection},
};

/// A rotation that passed kick testing.
#[derive(Debug, Clone, Copy)]
pub struct KickedRotation {
    /// The rotated piece at its kicked position.
    pub piece: Piece,
    /// The `(col, row)` offset of the kick candidate that succeeded.
    /// `(0, 0)` means the rotation fit in place.
    pub offset: (i16, i16),
}

/// Rotates `piece` in `direction`, trying each kick offset for its shape and
/// source rotation in order and returning the first placement `board` accepts.
///
/// Offsets use board coordinates with row increasing downward. O-pieces only
/// ever test the in-place candidate.
pub fn kicked_rotation(
    piece: &Piece,
    direction: RotationDirection,
    board: &Board,
) -> Result<KickedRotation, RotationRejected> {
    let rotated = piece.rotated(direction);
    for &(dcol, drow) in kick_offsets(piece.kind(), piece.rotation().index(), direction) {
        let candidate = rotated.shifted(dcol, drow);
        if board.can_place(&candidate) {
            return Ok(KickedRotation {
                piece: candidate,
                offset: (dcol, drow),
            });
        }
    }
    Err(RotationRejected)
}

fn kick_offsets(kind: PieceKind, from: u8, direction: RotationDirection) -> &'static [(i16, i16)] {
    let row = match direction {
        RotationDirection::Clockwise => from as usize,
        RotationDirection::CounterClockwise => 4 + from as usize,
    };
    match kind {
        PieceKind::O => &O_KICKS,
        PieceKind::I => &I_KICKS[row],
        _ => &JLSTZ_KICKS[row],
    }
}

// Kick tables indexed by [source rotation] for clockwise turns (rows 0..4)
// and [4 + source rotation] for counterclockwise turns (rows 4..8), with
// each row listing candidate (col, row) offsets in test order.
static JLSTZ_KICKS: [[(i16, i16); 5]; 8] = [
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

static I_KICKS: [[(i16, i16); 5]; 8] = [
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
];

static O_KICKS: [(i16, i16); 1] = [(0, 0)];
