//! Navigation system for Labyrinth
//!
//! This module holds the decision engine that turns per-frame target and wall
//! readings into one symbolic motor command, the per-session memory it
//! threads between frames, and every tunable the engine reads.

mod controller;
mod state;

pub use controller::{Maneuver, MovementController};
pub use state::{NavigationState, Side, DIFF_HISTORY_LEN};

use crate::{LabyrinthError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Navigation configuration
///
/// Ratios are fractions of the analysis band, offsets are fractions of the
/// frame width, areas are fractions of the frame area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Minimum normalised blob area for a target lock (strictly exceeded)
    pub min_target_area: f32,
    /// Offset band around the frame center treated as aligned
    pub target_align_tolerance: f32,
    /// Smoothed diff magnitude below which no lateral side is recorded
    pub side_dead_band: f32,
    /// Oscillation count that must be exceeded before forcing straight travel
    pub oscillation_limit: u32,
    /// Side ratio asymmetry ignored when updating the preferred turn direction
    pub centering_deadzone: f32,
    /// Smoothed diff magnitude that triggers a corridor centering turn
    pub centering_correction: f32,
    /// Minimum band wall density for corridor centering to apply
    pub centering_min_wall_ratio: f32,
    /// Center sub-band density above which the forward path is blocked
    pub blockage_threshold: f32,
    /// Side density both flanks must exceed for a dead end
    pub dead_end_side_ratio: f32,
    /// Band wall density at which avoidance is forced
    pub wall_very_close_ratio: f32,
    /// Smoothed diff magnitude below which the heading counts as aligned
    pub heading_aligned_diff: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            min_target_area: 0.0001,
            target_align_tolerance: 0.1,
            side_dead_band: 0.1,
            oscillation_limit: 4,
            centering_deadzone: 0.05,
            centering_correction: 0.25,
            centering_min_wall_ratio: 0.05,
            blockage_threshold: 0.5,
            dead_end_side_ratio: 0.3,
            wall_very_close_ratio: 0.8,
            heading_aligned_diff: 0.3,
        }
    }
}

impl NavigationConfig {
    /// Check every threshold lies in its meaningful range
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("min_target_area", self.min_target_area),
            ("side_dead_band", self.side_dead_band),
            ("centering_deadzone", self.centering_deadzone),
            ("centering_correction", self.centering_correction),
            ("centering_min_wall_ratio", self.centering_min_wall_ratio),
            ("blockage_threshold", self.blockage_threshold),
            ("dead_end_side_ratio", self.dead_end_side_ratio),
            ("wall_very_close_ratio", self.wall_very_close_ratio),
            ("heading_aligned_diff", self.heading_aligned_diff),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(LabyrinthError::InvalidConfig(format!(
                    "navigation.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=0.5).contains(&self.target_align_tolerance) {
            return Err(LabyrinthError::InvalidConfig(format!(
                "navigation.target_align_tolerance must be within [0, 0.5], got {}",
                self.target_align_tolerance
            )));
        }
        Ok(())
    }
}

/// Symbolic motor command emitted once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Cruise forward
    MoveForward,
    /// Hold position
    Stop,
    /// Small left correction
    TurnLeftFine,
    /// Small right correction
    TurnRightFine,
    /// Committed left avoidance turn
    TurnLeftSharp,
    /// Committed right avoidance turn
    TurnRightSharp,
}

impl Command {
    /// Sharp turn toward `side`; no preference turns right
    pub fn sharp_toward(side: Side) -> Self {
        match side {
            Side::Left => Command::TurnLeftSharp,
            Side::Right | Side::None => Command::TurnRightSharp,
        }
    }

    /// Rotation used while the camera feed is unusable
    pub fn searching() -> Self {
        Command::TurnRightSharp
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Command::MoveForward => "move_forward",
            Command::Stop => "stop",
            Command::TurnLeftFine => "turn_left_fine",
            Command::TurnRightFine => "turn_right_fine",
            Command::TurnLeftSharp => "turn_left_sharp",
            Command::TurnRightSharp => "turn_right_sharp",
        };
        f.write_str(name)
    }
}

/// Magnitudes used when rendering commands to the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandProfile {
    /// Speed sent with `MOVE` for forward cruise
    pub forward_speed: i32,
    /// Rotation for fine corrections, in degrees
    pub fine_turn_degrees: i32,
    /// Rotation for sharp avoidance turns, in degrees
    pub sharp_turn_degrees: i32,
}

impl CommandProfile {
    /// Turn magnitudes must be positive; the wire sign encodes direction
    pub fn validate(&self) -> Result<()> {
        for (name, degrees) in [
            ("fine_turn_degrees", self.fine_turn_degrees),
            ("sharp_turn_degrees", self.sharp_turn_degrees),
        ] {
            if degrees <= 0 {
                return Err(LabyrinthError::InvalidConfig(format!(
                    "commands.{} must be positive, got {}",
                    name, degrees
                )));
            }
        }
        Ok(())
    }
}

impl Default for CommandProfile {
    fn default() -> Self {
        CommandProfile {
            forward_speed: 1,
            fine_turn_degrees: 5,
            sharp_turn_degrees: 10,
        }
    }
}
