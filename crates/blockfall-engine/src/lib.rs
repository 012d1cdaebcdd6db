pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("no kick candidate produced a valid placement")]
pub struct RotationRejected;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HoldError {
    #[display("hold is disabled by configuration")]
    HoldDisabled,
    #[display("hold already used for this piece")]
    HoldAlreadyUsed,
    #[display("hold is only available while a piece is falling")]
    NotFalling,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("cell index ({col}, {row}) outside the board")]
pub struct CellIndexError {
    pub col: usize,
    pub row: usize,
}
