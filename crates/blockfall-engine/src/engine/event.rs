use crate::core::PieceKind;

/// How a spin was classified when a piece locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinKind {
    /// A kick-assisted rotation into a slot the piece cannot fall out of,
    /// with most of the rotation box walled in.
    Full,
    /// Same setup but with a more open rotation box; scores half the bonus.
    Mini,
}

/// Notable happenings during an update, drained with
/// [`GameSession::take_events`](super::GameSession::take_events).
///
/// Events are pushed in the order they occur within the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A piece was committed to the board.
    PieceLocked { kind: PieceKind },
    /// Full rows were removed.
    LineCleared {
        /// Number of rows cleared at once, 1 to 4. A value of 4 is a
        /// tetris, which scores and chains like a spin clear.
        rows: usize,
        /// Spin classification if the clear followed a scoring spin.
        spin: Option<SpinKind>,
        /// Whether this clear extended a back-to-back run.
        back_to_back: bool,
    },
    /// The level rose after enough cleared lines.
    LevelUp { new_level: u32 },
    /// A spawned piece overlapped the stack.
    GameOver,
    Paused,
    Resumed,
}
