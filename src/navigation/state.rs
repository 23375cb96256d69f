// src/navigation/state.rs
// Per-session memory of the decision engine: diff smoothing window,
// oscillation tracking and the sticky turn preference.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of raw wall diffs averaged into the smoothed diff
pub const DIFF_HISTORY_LEN: usize = 5;

/// Lateral sense
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Left of the heading
    Left,
    /// Right of the heading
    Right,
    /// No lateral preference
    #[default]
    None,
}

impl Side {
    /// Classify a smoothed diff; values within `dead_band` map to `None`
    pub fn from_diff(diff: f32, dead_band: f32) -> Self {
        if diff > dead_band {
            Side::Right
        } else if diff < -dead_band {
            Side::Left
        } else {
            Side::None
        }
    }

    /// Whether both sides are set and point in different directions
    pub fn opposes(self, other: Side) -> bool {
        self != Side::None && other != Side::None && self != other
    }
}

/// Decision engine memory, owned by exactly one session
///
/// Fields are only mutated through [`MovementController::decide`](super::MovementController::decide)
/// and [`NavigationState::reset`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationState {
    pub(crate) diff_history: VecDeque<f32>,
    pub(crate) oscillation_counter: u32,
    pub(crate) last_command_side: Side,
    pub(crate) last_turn_direction: Side,
    pub(crate) is_turning_maneuver: bool,
    pub(crate) frames_seen: u64,
}

impl NavigationState {
    /// Zero state for a fresh session
    pub fn new() -> Self {
        NavigationState {
            diff_history: VecDeque::with_capacity(DIFF_HISTORY_LEN),
            ..Default::default()
        }
    }

    /// Return every field to the zero state
    pub fn reset(&mut self) {
        self.diff_history.clear();
        self.oscillation_counter = 0;
        self.last_command_side = Side::None;
        self.last_turn_direction = Side::None;
        self.is_turning_maneuver = false;
        self.frames_seen = 0;
    }

    /// Push a raw diff, evicting the oldest once the window is full, and
    /// return the new smoothed diff
    pub(crate) fn push_diff(&mut self, raw_diff: f32) -> f32 {
        if self.diff_history.len() >= DIFF_HISTORY_LEN {
            self.diff_history.pop_front();
        }
        self.diff_history.push_back(raw_diff);
        self.smoothed_diff()
    }

    /// Mean of the diff window, 0 when empty
    pub fn smoothed_diff(&self) -> f32 {
        if self.diff_history.is_empty() {
            return 0.0;
        }
        self.diff_history.iter().sum::<f32>() / self.diff_history.len() as f32
    }

    /// Record the side of the current smoothed diff and update the
    /// oscillation counter
    pub(crate) fn track_oscillation(&mut self, side: Side) {
        if side.opposes(self.last_command_side) {
            self.oscillation_counter += 1;
        } else {
            self.oscillation_counter = self.oscillation_counter.saturating_sub(1);
        }
        self.last_command_side = side;
    }

    /// Raw diffs currently in the smoothing window, oldest first
    pub fn diff_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.diff_history.iter().copied()
    }

    /// Current left-right flapping count
    pub fn oscillation_counter(&self) -> u32 {
        self.oscillation_counter
    }

    /// Side of the previous frame's smoothed obstacle diff
    pub fn last_command_side(&self) -> Side {
        self.last_command_side
    }

    /// Preferred escape direction
    pub fn last_turn_direction(&self) -> Side {
        self.last_turn_direction
    }

    /// Whether a sharp avoidance turn is in progress
    pub fn is_turning_maneuver(&self) -> bool {
        self.is_turning_maneuver
    }

    /// Decisions made since the last reset
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.5, Side::Right)]
    #[case(0.1, Side::None)]
    #[case(-0.1, Side::None)]
    #[case(-0.11, Side::Left)]
    #[case(0.0, Side::None)]
    fn side_dead_band(#[case] diff: f32, #[case] expected: Side) {
        assert_eq!(Side::from_diff(diff, 0.1), expected);
    }

    #[test]
    fn history_never_exceeds_window() {
        let mut state = NavigationState::new();
        for i in 0..12 {
            state.push_diff(i as f32);
            assert!(state.diff_history().count() <= DIFF_HISTORY_LEN);
        }
        let kept: Vec<f32> = state.diff_history().collect();
        assert_eq!(kept, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn first_value_leaves_the_mean_after_five_more() {
        let mut state = NavigationState::new();
        state.push_diff(1.0);
        for _ in 0..DIFF_HISTORY_LEN {
            state.push_diff(0.0);
        }
        assert_eq!(state.smoothed_diff(), 0.0);
    }

    #[test]
    fn oscillation_counter_saturates_at_zero() {
        let mut state = NavigationState::new();
        state.track_oscillation(Side::Right);
        state.track_oscillation(Side::Left);
        assert_eq!(state.oscillation_counter(), 1);
        state.track_oscillation(Side::None);
        state.track_oscillation(Side::None);
        state.track_oscillation(Side::None);
        assert_eq!(state.oscillation_counter(), 0);
        assert_eq!(state.last_command_side(), Side::None);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut state = NavigationState::new();
        state.push_diff(0.4);
        state.track_oscillation(Side::Left);
        state.last_turn_direction = Side::Right;
        state.is_turning_maneuver = true;
        state.frames_seen = 9;

        state.reset();
        let once = state.clone();
        state.reset();
        assert_eq!(state, once);
        assert_eq!(once, NavigationState::new());
    }
}
