pub use self::{board::*, kicks::*, piece::*};

pub(crate) mod board;
pub(crate) mod kicks;
pub(crate) mod piece;

/// Buffer rows above the visible field where pieces spawn.
///
/// Row 0 of a [`Board`] is the topmost hidden row; visible row 0 is board
/// row `HIDDEN_ROWS`.
pub const HIDDEN_ROWS: usize = 2;
