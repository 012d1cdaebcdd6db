use serde::{Deserialize, Serialize};

/// Errors detected by [`GameConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    /// The board is too small to place every piece shape.
    #[display("board is {width}x{height}, minimum is {MIN_BOARD_WIDTH}x{MIN_BOARD_HEIGHT}")]
    BoardTooSmall { width: usize, height: usize },
    /// The gravity table has no entries.
    #[display("gravity table is empty")]
    EmptyGravityTable,
    /// A gravity entry is zero frames per cell.
    #[display("gravity entry for level {level} is zero")]
    ZeroGravityEntry { level: u32 },
    /// Gravity must not slow down as the level rises.
    #[display("gravity entry for level {level} is slower than the previous level")]
    NonMonotonicGravity { level: u32 },
    #[display("level_up_lines must be at least 1")]
    ZeroLevelUpLines,
    #[display("max_level must be at least 1")]
    ZeroMaxLevel,
    #[display("preview_count is {count}, expected 1 to {MAX_PREVIEW_COUNT}")]
    PreviewCountOutOfRange { count: usize },
}

/// Smallest board that fits every piece's bounding box.
pub const MIN_BOARD_WIDTH: usize = 4;
pub const MIN_BOARD_HEIGHT: usize = 4;

/// Longest supported preview, one full bag.
pub const MAX_PREVIEW_COUNT: usize = 7;

/// Frames-per-cell descent speed per level, indexed from level 1.
///
/// Levels beyond the last entry fall at the last entry's speed. Frame counts
/// are converted to milliseconds at 60 frames per second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GravityTable(Vec<u32>);

impl GravityTable {
    #[must_use]
    pub fn new(frames: Vec<u32>) -> Self {
        Self(frames)
    }

    /// Descent speed at `level` in frames per cell, clamped to the table's
    /// last entry for high levels.
    #[must_use]
    pub fn frames_per_cell(&self, level: u32) -> u32 {
        let index = usize::try_from(level.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .min(self.0.len().saturating_sub(1));
        self.0[index]
    }

    /// Descent interval at `level` in milliseconds, at 60 frames per second.
    #[must_use]
    pub fn interval_ms(&self, level: u32) -> u32 {
        self.frames_per_cell(level) * 1000 / 60
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::EmptyGravityTable);
        }
        let mut prev = u32::MAX;
        for (i, &frames) in self.0.iter().enumerate() {
            #[expect(clippy::cast_possible_truncation)]
            let level = i as u32 + 1;
            if frames == 0 {
                return Err(ConfigError::ZeroGravityEntry { level });
            }
            if frames > prev {
                return Err(ConfigError::NonMonotonicGravity { level });
            }
            prev = frames;
        }
        Ok(())
    }
}

impl Default for GravityTable {
    fn default() -> Self {
        Self(vec![
            60, 50, 40, 30, 25, 20, 15, 12, 10, 8, 7, 6, 5, 4, 3, 3, 2, 2, 1, 1,
        ])
    }
}

/// Tunable rules for a [`GameSession`](super::GameSession).
///
/// All durations are in milliseconds. The default rules are a 10x20 board
/// with guideline-style timings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board width in columns.
    pub board_width: usize,
    /// Visible board height in rows, not counting the hidden spawn buffer.
    pub board_height: usize,
    /// Delay before a held direction starts auto-repeating.
    pub das_delay_ms: u32,
    /// Interval between auto-repeated shifts. Zero means instant slide to
    /// the wall.
    pub arr_delay_ms: u32,
    /// Time a grounded piece may sit before locking.
    pub lock_delay_ms: u32,
    /// How many times movement or rotation may restart the lock delay per
    /// piece.
    pub lock_reset_limit: u8,
    /// Pause between a line clear and the next spawn.
    pub line_clear_delay_ms: u32,
    /// Descent speed per level.
    pub gravity_table: GravityTable,
    /// Lines required to advance one level.
    pub level_up_lines: u32,
    /// Level cap.
    pub max_level: u32,
    /// Whether the ghost piece projection is computed.
    pub ghost_enabled: bool,
    /// Whether the hold slot is available.
    pub hold_enabled: bool,
    /// How many upcoming pieces the preview exposes.
    pub preview_count: usize,
    /// Whether kick-assisted spins score bonus points.
    pub spin_bonus_enabled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 10,
            board_height: 20,
            das_delay_ms: 170,
            arr_delay_ms: 50,
            lock_delay_ms: 500,
            lock_reset_limit: 15,
            line_clear_delay_ms: 200,
            gravity_table: GravityTable::default(),
            level_up_lines: 10,
            max_level: 20,
            ghost_enabled: true,
            hold_enabled: true,
            preview_count: 5,
            spin_bonus_enabled: true,
        }
    }
}

impl GameConfig {
    /// Checks the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_width < MIN_BOARD_WIDTH || self.board_height < MIN_BOARD_HEIGHT {
            return Err(ConfigError::BoardTooSmall {
                width: self.board_width,
                height: self.board_height,
            });
        }
        self.gravity_table.validate()?;
        if self.level_up_lines == 0 {
            return Err(ConfigError::ZeroLevelUpLines);
        }
        if self.max_level == 0 {
            return Err(ConfigError::ZeroMaxLevel);
        }
        if self.preview_count == 0 || self.preview_count > MAX_PREVIEW_COUNT {
            return Err(ConfigError::PreviewCountOutOfRange {
                count: self.preview_count,
            });
        }
        Ok(())
    }
}
