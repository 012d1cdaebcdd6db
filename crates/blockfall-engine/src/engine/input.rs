use arrayvec::ArrayVec;

use crate::core::RotationDirection;

/// Raw button state sampled by the frontend once per frame.
///
/// Held buttons stay `true` for as long as they are down; edge detection
/// and auto-repeat are the [`InputTimer`]'s job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub rotate_cw: bool,
    pub rotate_ccw: bool,
    pub soft_drop: bool,
    pub hard_drop: bool,
    pub hold: bool,
    pub pause: bool,
}

/// A horizontal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDir {
    Left,
    Right,
}

impl HorizontalDir {
    #[must_use]
    pub const fn delta(self) -> i16 {
        match self {
            HorizontalDir::Left => -1,
            HorizontalDir::Right => 1,
        }
    }
}

/// A discrete action produced from raw input by the [`InputTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    TogglePause,
    Hold,
    Rotate(RotationDirection),
    /// One horizontal step, either a fresh tap or one auto-repeat tick.
    Shift(HorizontalDir),
    /// Move as far as possible toward the wall; emitted instead of
    /// [`Self::Shift`] repeats when the repeat interval is zero.
    SlideToWall(HorizontalDir),
    HardDrop,
}

const MAX_EVENTS_PER_UPDATE: usize = 16;

/// Translates raw input snapshots into game actions, applying delayed
/// auto-shift (DAS) and auto-repeat rate (ARR) to held directions.
///
/// A fresh horizontal press shifts immediately. Holding the direction for
/// the DAS delay starts auto-repeat, which then emits one shift per ARR
/// interval. Rotation, hold, hard drop, and pause fire on press edges only.
#[derive(Debug, Clone)]
pub struct InputTimer {
    das_delay_ms: u32,
    arr_delay_ms: u32,
    horizontal: Option<HorizontalDir>,
    das_timer_ms: u32,
    arr_accumulator_ms: u32,
    prev: InputSnapshot,
}

impl InputTimer {
    #[must_use]
    pub fn new(das_delay_ms: u32, arr_delay_ms: u32) -> Self {
        Self {
            das_delay_ms,
            arr_delay_ms,
            horizontal: None,
            das_timer_ms: 0,
            arr_accumulator_ms: 0,
            prev: InputSnapshot::default(),
        }
    }

    /// Advances the timers by `dt_ms` and returns the actions the new
    /// snapshot produces, in application order.
    pub fn update(
        &mut self,
        dt_ms: u32,
        snapshot: InputSnapshot,
    ) -> ArrayVec<InputEvent, MAX_EVENTS_PER_UPDATE> {
        let mut events = ArrayVec::new();

        if snapshot.pause && !self.prev.pause {
            events.push(InputEvent::TogglePause);
        }
        if snapshot.hold && !self.prev.hold {
            events.push(InputEvent::Hold);
        }
        if snapshot.rotate_cw && !self.prev.rotate_cw {
            events.push(InputEvent::Rotate(RotationDirection::Clockwise));
        }
        if snapshot.rotate_ccw && !self.prev.rotate_ccw {
            events.push(InputEvent::Rotate(RotationDirection::CounterClockwise));
        }

        // Reserve room so a burst of repeats cannot swallow the press edge.
        let hard_drop_edge = snapshot.hard_drop && !self.prev.hard_drop;
        self.update_horizontal(dt_ms, snapshot, usize::from(hard_drop_edge), &mut events);

        if hard_drop_edge {
            events.push(InputEvent::HardDrop);
        }

        self.prev = snapshot;
        events
    }

    fn update_horizontal(
        &mut self,
        dt_ms: u32,
        snapshot: InputSnapshot,
        reserved: usize,
        events: &mut ArrayVec<InputEvent, MAX_EVENTS_PER_UPDATE>,
    ) {
        let direction = self.resolve_direction(snapshot);
        let Some(direction) = direction else {
            self.horizontal = None;
            self.das_timer_ms = 0;
            self.arr_accumulator_ms = 0;
            return;
        };

        if self.horizontal != Some(direction) {
            // Fresh press or direction change: shift once, restart charging.
            self.horizontal = Some(direction);
            self.das_timer_ms = 0;
            self.arr_accumulator_ms = 0;
            let _ = events.try_push(InputEvent::Shift(direction));
            return;
        }

        let was_charged = self.das_timer_ms >= self.das_delay_ms;
        self.das_timer_ms = self.das_timer_ms.saturating_add(dt_ms);
        if self.das_timer_ms < self.das_delay_ms {
            return;
        }
        if self.arr_delay_ms == 0 {
            let _ = events.try_push(InputEvent::SlideToWall(direction));
            return;
        }
        // Time spent finishing the DAS charge does not count toward repeats.
        self.arr_accumulator_ms += if was_charged {
            dt_ms
        } else {
            self.das_timer_ms - self.das_delay_ms
        };
        while self.arr_accumulator_ms >= self.arr_delay_ms {
            self.arr_accumulator_ms -= self.arr_delay_ms;
            if events.remaining_capacity() <= reserved {
                self.arr_accumulator_ms = 0;
                break;
            }
            events.push(InputEvent::Shift(direction));
        }
    }

    /// Picks the active direction when one or both horizontal buttons are
    /// down. A freshly pressed button takes over from a held one.
    fn resolve_direction(&self, snapshot: InputSnapshot) -> Option<HorizontalDir> {
        let left_edge = snapshot.left && !self.prev.left;
        let right_edge = snapshot.right && !self.prev.right;
        match (snapshot.left, snapshot.right) {
            (false, false) => None,
            (true, false) => Some(HorizontalDir::Left),
            (false, true) => Some(HorizontalDir::Right),
            (true, true) => {
                if right_edge && !left_edge {
                    Some(HorizontalDir::Right)
                } else if left_edge && !right_edge {
                    Some(HorizontalDir::Left)
                } else {
                    self.horizontal.or(Some(HorizontalDir::Left))
                }
            }
        }
    }

    /// Edge-detects only the pause button, leaving the movement timers
    /// untouched. Used while the game is paused so a held direction keeps
    /// its charge across the pause.
    pub fn pause_pressed(&mut self, snapshot: InputSnapshot) -> bool {
        let pressed = snapshot.pause && !self.prev.pause;
        self.prev.pause = snapshot.pause;
        pressed
    }

    /// Whether soft drop was held in the most recent snapshot.
    #[must_use]
    pub fn soft_drop_held(&self) -> bool {
        self.prev.soft_drop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_held() -> InputSnapshot {
        InputSnapshot {
            left: true,
            ..InputSnapshot::default()
        }
    }

    #[test]
    fn test_tap_shifts_once() {
        let mut timer = InputTimer::new(170, 50);
        let events = timer.update(16, left_held());
        assert_eq!(&events[..], [InputEvent::Shift(HorizontalDir::Left)]);
        let events = timer.update(16, InputSnapshot::default());
        assert!(events.is_empty());
    }

    #[test]
    fn test_no_repeat_before_das_expires() {
        let mut timer = InputTimer::new(170, 50);
        timer.update(16, left_held());
        let mut total = 0;
        while total + 16 < 170 {
            total += 16;
            assert!(timer.update(16, left_held()).is_empty());
        }
    }

    #[test]
    fn test_repeats_at_arr_interval_after_das() {
        let mut timer = InputTimer::new(100, 50);
        timer.update(16, left_held());
        // Charge DAS fully.
        timer.update(100, left_held());
        // Each 50 ms now yields one shift.
        for _ in 0..4 {
            let events = timer.update(50, left_held());
            assert_eq!(&events[..], [InputEvent::Shift(HorizontalDir::Left)]);
        }
        // A larger step yields proportionally more shifts.
        let events = timer.update(150, left_held());
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_zero_arr_slides_to_wall() {
        let mut timer = InputTimer::new(100, 0);
        timer.update(16, left_held());
        let events = timer.update(100, left_held());
        assert_eq!(&events[..], [InputEvent::SlideToWall(HorizontalDir::Left)]);
    }

    #[test]
    fn test_direction_change_restarts_das() {
        let mut timer = InputTimer::new(100, 50);
        timer.update(16, left_held());
        timer.update(90, left_held());
        let right = InputSnapshot {
            right: true,
            ..InputSnapshot::default()
        };
        // Switching direction shifts immediately but must re-charge DAS.
        let events = timer.update(16, right);
        assert_eq!(&events[..], [InputEvent::Shift(HorizontalDir::Right)]);
        assert!(timer.update(90, right).is_empty());
    }

    #[test]
    fn test_fresh_press_wins_when_both_held() {
        let mut timer = InputTimer::new(100, 50);
        timer.update(16, left_held());
        let both = InputSnapshot {
            left: true,
            right: true,
            ..InputSnapshot::default()
        };
        let events = timer.update(16, both);
        assert_eq!(&events[..], [InputEvent::Shift(HorizontalDir::Right)]);
        // Holding both without a new edge keeps the takeover direction.
        timer.update(200, both);
        let events = timer.update(50, both);
        assert_eq!(&events[..], [InputEvent::Shift(HorizontalDir::Right)]);
    }

    #[test]
    fn test_press_edges_fire_once() {
        let mut timer = InputTimer::new(170, 50);
        let snapshot = InputSnapshot {
            rotate_cw: true,
            hard_drop: true,
            hold: true,
            ..InputSnapshot::default()
        };
        let events = timer.update(16, snapshot);
        assert_eq!(
            &events[..],
            [
                InputEvent::Hold,
                InputEvent::Rotate(RotationDirection::Clockwise),
                InputEvent::HardDrop,
            ]
        );
        assert!(timer.update(16, snapshot).is_empty());
    }

    #[test]
    fn test_hard_drop_edge_survives_repeat_burst() {
        let mut timer = InputTimer::new(100, 50);
        timer.update(16, left_held());
        // One laggy frame: the repeat backlog would fill the buffer on its
        // own, but the hard drop press must still come through.
        let snapshot = InputSnapshot {
            left: true,
            hard_drop: true,
            ..InputSnapshot::default()
        };
        let events = timer.update(1000, snapshot);
        assert_eq!(events.last(), Some(&InputEvent::HardDrop));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, InputEvent::Shift(_)))
                .count(),
            events.len() - 1
        );
        // The edge was consumed; holding the button does not refire it.
        assert!(!timer.update(50, snapshot).contains(&InputEvent::HardDrop));
    }

    #[test]
    fn test_das_charge_survives_pause() {
        let mut timer = InputTimer::new(100, 50);
        timer.update(16, left_held());
        timer.update(100, left_held());
        // Paused frames only look at the pause button.
        let paused = InputSnapshot {
            left: true,
            pause: true,
            ..InputSnapshot::default()
        };
        assert!(timer.pause_pressed(paused));
        assert!(!timer.pause_pressed(paused));
        // Back in play, the charged DAS repeats without re-tapping.
        let events = timer.update(50, left_held());
        assert_eq!(&events[..], [InputEvent::Shift(HorizontalDir::Left)]);
    }

    #[test]
    fn test_soft_drop_held_tracks_snapshot() {
        let mut timer = InputTimer::new(170, 50);
        assert!(!timer.soft_drop_held());
        timer.update(
            16,
            InputSnapshot {
                soft_drop: true,
                ..InputSnapshot::default()
            },
        );
        assert!(timer.soft_drop_held());
        timer.update(16, InputSnapshot::default());
        assert!(!timer.soft_drop_held());
    }
}
