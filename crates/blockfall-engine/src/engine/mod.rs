//! Game logic built on top of the core data structures.
//!
//! - [`GameSession`] - the playable state machine driven by [`GameSession::update`]
//! - [`GameConfig`] - tunable rules (board size, timings, gravity, features)
//! - [`PieceQueue`] - 7-bag piece generation with preview
//! - [`InputTimer`] - DAS/ARR translation of raw input snapshots into actions
//! - [`GameSnapshot`] - read-only view for rendering
//! - [`GameEvent`] - notable happenings drained after each update
//!
//! # Game Flow
//!
//! 1. Build a [`GameConfig`] (or use the default rules) and create a
//!    [`GameSession`] from it
//! 2. Each frame, sample the player's raw input into an [`InputSnapshot`]
//!    and call [`GameSession::update`] with the elapsed milliseconds
//! 3. Drain [`GameSession::take_events`] and render from
//!    [`GameSession::snapshot`]
//! 4. Repeat until the session reaches the game-over phase

pub use self::{config::*, event::*, input::*, queue::*, session::*, snapshot::*};

mod config;
mod event;
mod input;
mod queue;
mod session;
mod snapshot;
