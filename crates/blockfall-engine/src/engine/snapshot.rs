use arrayvec::ArrayVec;
use serde::Serialize;

use crate::core::{Board, Piece, PieceKind};

use super::config::MAX_PREVIEW_COUNT;

/// Which part of the piece lifecycle the session is in, without the
/// internal timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
pub enum PhaseTag {
    /// A piece is falling under player control.
    Falling,
    /// A grounded piece is waiting out the lock delay.
    Locking,
    /// Cleared rows are held on screen before the next spawn.
    Clearing,
    Paused,
    GameOver,
}

/// Read-only view of the session for rendering, valid for one frame.
///
/// Serializable so out-of-process renderers can consume it as well.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot<'a> {
    pub board: &'a Board,
    /// The piece under player control, absent while clearing or after
    /// game over.
    pub falling: Option<Piece>,
    /// Where the falling piece would land, when the ghost is enabled.
    pub ghost: Option<Piece>,
    pub held: Option<PieceKind>,
    pub upcoming: ArrayVec<PieceKind, MAX_PREVIEW_COUNT>,
    /// Rows being cleared, top to bottom; empty outside the clearing phase.
    pub clearing_rows: &'a [usize],
    pub phase: PhaseTag,
    pub score: u32,
    pub level: u32,
    pub total_lines: u32,
    /// Consecutive clearing locks; 0 when the last lock cleared nothing.
    pub combo: u32,
    /// Length of the current run of tetrises and spin clears.
    pub back_to_back: u32,
}
