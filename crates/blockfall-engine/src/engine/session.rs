use std::mem;

use log::{debug, info};
use rand::Rng as _;

use crate::{
    HoldError,
    core::{Board, Piece, PieceKind, RotationDirection, kicked_rotation},
};

use super::{
    config::{ConfigError, GameConfig},
    event::{GameEvent, SpinKind},
    input::{HorizontalDir, InputEvent, InputSnapshot, InputTimer},
    queue::{PieceQueue, QueueSeed},
    snapshot::{GameSnapshot, PhaseTag},
};

/// Base points per cleared row count, multiplied by the level.
const SCORE_TABLE: [u32; 5] = [0, 100, 300, 500, 800];
const SPIN_BONUS_FULL: u32 = 400;
const SPIN_BONUS_MINI: u32 = 200;
const BACK_TO_BACK_NUMERATOR: u32 = 3;
const BACK_TO_BACK_DENOMINATOR: u32 = 2;
const COMBO_POINTS: u32 = 50;
const SOFT_DROP_POINTS_PER_CELL: u32 = 1;
const HARD_DROP_POINTS_PER_CELL: u32 = 2;
/// Soft drop descends at the gravity interval divided by this.
const SOFT_DROP_DIVISOR: u32 = 20;

/// The piece lifecycle, with the timer state each phase needs.
#[derive(Debug, Clone)]
enum Phase {
    /// A piece is falling under player control.
    Falling,
    /// The piece is grounded and waiting out the lock delay.
    Locking { remaining_ms: u32 },
    /// Cleared rows are held on screen before the next spawn.
    Clearing { remaining_ms: u32 },
    /// Pause wraps whatever phase it interrupted.
    Paused(Box<Phase>),
    GameOver,
}

/// A playable game driven by [`Self::update`] once per frame.
///
/// The session owns the board, the piece queue, and the input timers.
/// Frontends feed it raw [`InputSnapshot`]s plus elapsed milliseconds, then
/// render from [`Self::snapshot`] and react to [`Self::take_events`].
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    queue: PieceQueue,
    timer: InputTimer,
    phase: Phase,
    falling: Option<Piece>,
    held: Option<PieceKind>,
    hold_used: bool,
    lock_resets: u8,
    /// Kick offset of the most recent successful rotation, cleared by any
    /// later shift or descent. Non-zero at lock time marks a spin.
    last_rotation_kick: Option<(i16, i16)>,
    drop_timer_ms: u32,
    clearing_rows: Vec<usize>,
    score: u32,
    level: u32,
    total_lines: u32,
    lines_since_level_up: u32,
    soft_drop_cells: u32,
    hard_drop_cells: u32,
    combo: u32,
    back_to_back: u32,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Creates a session with a random piece seed.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a reproducible piece
    /// sequence.
    pub fn with_seed(config: GameConfig, seed: QueueSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.board_width, config.board_height);
        let queue = PieceQueue::with_seed(config.preview_count, seed);
        let timer = InputTimer::new(config.das_delay_ms, config.arr_delay_ms);
        let mut session = Self {
            config,
            board,
            queue,
            timer,
            phase: Phase::Falling,
            falling: None,
            held: None,
            hold_used: false,
            lock_resets: 0,
            last_rotation_kick: None,
            drop_timer_ms: 0,
            clearing_rows: Vec::new(),
            score: 0,
            level: 1,
            total_lines: 0,
            lines_since_level_up: 0,
            soft_drop_cells: 0,
            hard_drop_cells: 0,
            combo: 0,
            back_to_back: 0,
            events: Vec::new(),
        };
        session.spawn_from_queue();
        Ok(session)
    }

    /// Advances the game by `dt_ms` under the given raw input.
    ///
    /// While paused only the pause button is read, so held directions keep
    /// their auto-repeat charge across the pause. After game over updates
    /// are no-ops.
    pub fn update(&mut self, dt_ms: u32, snapshot: InputSnapshot) {
        if matches!(self.phase, Phase::GameOver) {
            return;
        }
        if matches!(self.phase, Phase::Paused(_)) {
            if self.timer.pause_pressed(snapshot) {
                self.resume();
            }
            return;
        }
        let input_events = self.timer.update(dt_ms, snapshot);
        for event in input_events {
            self.apply_input(event);
        }
        self.advance_time(dt_ms);
    }

    /// Takes the events generated since the last call, in occurrence order.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Read-only view of the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot<'_> {
        let ghost = if self.config.ghost_enabled {
            self.falling.map(|piece| piece.drop_projection(&self.board))
        } else {
            None
        };
        GameSnapshot {
            board: &self.board,
            falling: self.falling,
            ghost,
            held: self.held,
            upcoming: self.queue.upcoming().collect(),
            clearing_rows: &self.clearing_rows,
            phase: self.phase_tag(),
            score: self.score,
            level: self.level,
            total_lines: self.total_lines,
            combo: self.combo,
            back_to_back: self.back_to_back,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn total_lines(&self) -> u32 {
        self.total_lines
    }

    /// Cells descended under a held soft drop.
    #[must_use]
    pub fn soft_drop_cells(&self) -> u32 {
        self.soft_drop_cells
    }

    /// Cells covered by hard drops.
    #[must_use]
    pub fn hard_drop_cells(&self) -> u32 {
        self.hard_drop_cells
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver)
    }

    /// Stores the falling piece and continues with the previously held piece,
    /// or the next queued piece on the first hold. Allowed once per spawn,
    /// only while the piece is in free fall.
    pub fn try_hold(&mut self) -> Result<(), HoldError> {
        if !self.config.hold_enabled {
            return Err(HoldError::HoldDisabled);
        }
        if !matches!(self.phase, Phase::Falling) {
            return Err(HoldError::NotFalling);
        }
        if self.hold_used {
            return Err(HoldError::HoldAlreadyUsed);
        }
        let Some(current) = self.falling else {
            return Err(HoldError::NotFalling);
        };
        let next_kind = match self.held.replace(current.kind()) {
            Some(kind) => kind,
            None => self.queue.pop_next(),
        };
        self.spawn_piece(next_kind);
        self.hold_used = true;
        Ok(())
    }

    fn phase_tag(&self) -> PhaseTag {
        match self.phase {
            Phase::Falling => PhaseTag::Falling,
            Phase::Locking { .. } => PhaseTag::Locking,
            Phase::Clearing { .. } => PhaseTag::Clearing,
            Phase::Paused(_) => PhaseTag::Paused,
            Phase::GameOver => PhaseTag::GameOver,
        }
    }

    fn apply_input(&mut self, event: InputEvent) {
        if matches!(self.phase, Phase::GameOver) {
            return;
        }
        match event {
            InputEvent::TogglePause => self.pause(),
            InputEvent::Hold => {
                if let Err(err) = self.try_hold() {
                    debug!("hold rejected: {err}");
                }
            }
            InputEvent::Rotate(direction) => self.try_rotate(direction),
            InputEvent::Shift(direction) => {
                self.try_shift(direction);
            }
            InputEvent::SlideToWall(direction) => while self.try_shift(direction) {},
            InputEvent::HardDrop => self.hard_drop(),
        }
    }

    fn pause(&mut self) {
        debug!("paused");
        let interrupted = mem::replace(&mut self.phase, Phase::GameOver);
        self.phase = Phase::Paused(Box::new(interrupted));
        self.events.push(GameEvent::Paused);
    }

    fn resume(&mut self) {
        if let Phase::Paused(interrupted) = mem::replace(&mut self.phase, Phase::GameOver) {
            self.phase = *interrupted;
            debug!("resumed");
            self.events.push(GameEvent::Resumed);
        }
    }

    fn piece_is_controllable(&self) -> bool {
        matches!(self.phase, Phase::Falling | Phase::Locking { .. })
    }

    fn try_shift(&mut self, direction: HorizontalDir) -> bool {
        if !self.piece_is_controllable() {
            return false;
        }
        let Some(piece) = self.falling else {
            return false;
        };
        let moved = piece.shifted(direction.delta(), 0);
        if !self.board.can_place(&moved) {
            return false;
        }
        self.falling = Some(moved);
        self.last_rotation_kick = None;
        self.reset_lock_delay();
        true
    }

    fn try_rotate(&mut self, direction: RotationDirection) {
        if !self.piece_is_controllable() {
            return;
        }
        let Some(piece) = self.falling else {
            return;
        };
        if let Ok(kicked) = kicked_rotation(&piece, direction, &self.board) {
            self.falling = Some(kicked.piece);
            self.last_rotation_kick = Some(kicked.offset);
            self.reset_lock_delay();
        }
    }

    /// A successful move or rotation restarts the lock delay, up to the
    /// configured reset limit per piece.
    fn reset_lock_delay(&mut self) {
        if let Phase::Locking { remaining_ms } = &mut self.phase
            && self.lock_resets < self.config.lock_reset_limit
        {
            self.lock_resets += 1;
            *remaining_ms = self.config.lock_delay_ms;
        }
    }

    fn hard_drop(&mut self) {
        if !self.piece_is_controllable() {
            return;
        }
        let Some(piece) = self.falling else {
            return;
        };
        let dropped = piece.drop_projection(&self.board);
        let distance = u32::try_from(dropped.row() - piece.row()).unwrap_or(0);
        if distance > 0 {
            // The descent makes a preceding rotation no longer the last action.
            self.last_rotation_kick = None;
        }
        self.hard_drop_cells += distance;
        self.score += HARD_DROP_POINTS_PER_CELL * distance;
        self.falling = Some(dropped);
        self.lock_now();
    }

    fn advance_time(&mut self, dt_ms: u32) {
        match &self.phase {
            Phase::Falling => self.apply_gravity(dt_ms),
            Phase::Locking { remaining_ms } => {
                let remaining_ms = *remaining_ms;
                self.advance_locking(remaining_ms, dt_ms);
            }
            Phase::Clearing { remaining_ms } => {
                let remaining_ms = remaining_ms.saturating_sub(dt_ms);
                if remaining_ms == 0 {
                    self.spawn_from_queue();
                } else {
                    self.phase = Phase::Clearing { remaining_ms };
                }
            }
            Phase::Paused(_) | Phase::GameOver => {}
        }
    }

    fn advance_locking(&mut self, remaining_ms: u32, dt_ms: u32) {
        // A reset or shift may have opened space below; fall again.
        if self
            .falling
            .as_ref()
            .is_some_and(|piece| self.board.can_place(&piece.down()))
        {
            self.phase = Phase::Falling;
            self.drop_timer_ms = 0;
            self.apply_gravity(dt_ms);
            return;
        }
        let remaining_ms = remaining_ms.saturating_sub(dt_ms);
        if remaining_ms == 0 {
            self.lock_now();
        } else {
            self.phase = Phase::Locking { remaining_ms };
        }
    }

    fn gravity_interval_ms(&self) -> u32 {
        let mut frames = self.config.gravity_table.frames_per_cell(self.level);
        if self.timer.soft_drop_held() {
            frames = (frames / SOFT_DROP_DIVISOR).max(1);
        }
        // Frame counts are at 60 fps.
        frames * 1000 / 60
    }

    fn apply_gravity(&mut self, dt_ms: u32) {
        let interval = self.gravity_interval_ms();
        self.drop_timer_ms += dt_ms;
        while self.drop_timer_ms >= interval {
            self.drop_timer_ms -= interval;
            let Some(piece) = self.falling else {
                return;
            };
            let down = piece.down();
            if self.board.can_place(&down) {
                self.falling = Some(down);
                self.last_rotation_kick = None;
                if self.timer.soft_drop_held() {
                    self.soft_drop_cells += 1;
                    self.score += SOFT_DROP_POINTS_PER_CELL;
                }
            } else {
                self.drop_timer_ms = 0;
                self.phase = Phase::Locking {
                    remaining_ms: self.config.lock_delay_ms,
                };
                debug!("piece grounded, lock delay started");
                return;
            }
        }
    }

    fn lock_now(&mut self) {
        let Some(piece) = self.falling.take() else {
            return;
        };
        let spin = self.classify_spin(&piece);
        self.board.commit(&piece);
        debug!("locked {:?} at col {}, row {}", piece.kind(), piece.col(), piece.row());
        self.events.push(GameEvent::PieceLocked { kind: piece.kind() });

        let cleared = self.board.clear_full_rows();
        if cleared.is_empty() {
            self.combo = 0;
            self.spawn_from_queue();
            return;
        }
        self.apply_clear_scoring(cleared.len(), spin);
        self.clearing_rows = cleared;
        self.phase = Phase::Clearing {
            remaining_ms: self.config.line_clear_delay_ms.max(1),
        };
    }

    fn apply_clear_scoring(&mut self, rows: usize, spin: Option<SpinKind>) {
        let spin_bonus = match spin {
            Some(SpinKind::Full) => SPIN_BONUS_FULL,
            Some(SpinKind::Mini) => SPIN_BONUS_MINI,
            None => 0,
        };
        let mut base = SCORE_TABLE[rows.min(4)] + spin_bonus;

        // Tetrises and spin clears chain back-to-back for a 1.5x bonus.
        let damaging = rows == 4 || spin.is_some();
        let extends_run = damaging && self.back_to_back > 0;
        if extends_run {
            base = base * BACK_TO_BACK_NUMERATOR / BACK_TO_BACK_DENOMINATOR;
        }
        if damaging {
            self.back_to_back += 1;
        } else {
            self.back_to_back = 0;
        }

        self.combo += 1;
        let mut points = base * self.level;
        if self.combo > 1 {
            points += COMBO_POINTS * self.combo * self.level;
        }
        self.score += points;

        self.events.push(GameEvent::LineCleared {
            rows,
            spin,
            back_to_back: extends_run,
        });
        #[expect(clippy::cast_possible_truncation)]
        let rows = rows as u32;
        self.total_lines += rows;
        self.lines_since_level_up += rows;
        while self.lines_since_level_up >= self.config.level_up_lines
            && self.level < self.config.max_level
        {
            self.lines_since_level_up -= self.config.level_up_lines;
            self.level += 1;
            info!("level up: {}", self.level);
            self.events.push(GameEvent::LevelUp {
                new_level: self.level,
            });
        }
    }

    /// A lock is a spin when the piece arrived by a kicked rotation and
    /// cannot descend. T pieces are graded by how walled-in the rotation box
    /// is; everything else counts as a mini spin.
    fn classify_spin(&self, piece: &Piece) -> Option<SpinKind> {
        if !self.config.spin_bonus_enabled {
            return None;
        }
        let (dcol, drow) = self.last_rotation_kick?;
        if (dcol, drow) == (0, 0) {
            return None;
        }
        if self.board.can_place(&piece.down()) {
            return None;
        }
        if piece.kind() != PieceKind::T {
            return Some(SpinKind::Mini);
        }
        let (col, row) = (piece.col(), piece.row());
        let blocked = [(col, row), (col + 2, row), (col, row + 2), (col + 2, row + 2)]
            .into_iter()
            .filter(|&(col, row)| self.corner_blocked(col, row))
            .count();
        if blocked >= 3 {
            Some(SpinKind::Full)
        } else {
            Some(SpinKind::Mini)
        }
    }

    /// Out of bounds counts as blocked.
    fn corner_blocked(&self, col: i16, row: i16) -> bool {
        let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row)) else {
            return true;
        };
        self.board.cell(col, row).map_or(true, |cell| !cell.is_empty())
    }

    fn spawn_from_queue(&mut self) {
        let kind = self.queue.pop_next();
        self.spawn_piece(kind);
        self.hold_used = false;
    }

    /// Places a fresh piece at its spawn position; a blocked spawn is a
    /// top-out and ends the game.
    fn spawn_piece(&mut self, kind: PieceKind) {
        self.clearing_rows.clear();
        self.lock_resets = 0;
        self.drop_timer_ms = 0;
        self.last_rotation_kick = None;
        let piece = Piece::spawn(kind, self.config.board_width);
        if self.board.can_place(&piece) {
            self.falling = Some(piece);
            self.phase = Phase::Falling;
        } else {
            info!("spawn blocked, game over");
            self.falling = None;
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }
}

#[cfg(test)]
impl GameSession {
    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn force_falling(&mut self, piece: Piece) {
        assert!(self.board.can_place(&piece));
        self.falling = Some(piece);
        self.phase = Phase::Falling;
        self.lock_resets = 0;
        self.drop_timer_ms = 0;
        self.last_rotation_kick = None;
    }

    fn force_rotation_kick(&mut self, offset: (i16, i16)) {
        self.last_rotation_kick = Some(offset);
    }

    fn falling_piece(&self) -> Piece {
        self.falling.unwrap()
    }
}
