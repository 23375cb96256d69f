// src/navigation/controller.rs
// Rule-based decision engine: target seeking first, then obstacle analysis
// and an ordered movement resolution. All memory lives in NavigationState.

use super::{Command, NavigationConfig, NavigationState, Side};
use crate::perception::{Features, ObstacleReading, TargetReading};
use log::{debug, trace};

/// Movement outcome picked for a frame without a target lock.
///
/// Variants are listed in evaluation order; the first that applies wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Maneuver {
    /// Forward path open and heading aligned
    ClearPath,
    /// Forward path and both flanks walled off
    DeadEnd,
    /// Left-right flapping in open space, forced straight
    OscillationRelief,
    /// Fine turn away from the heavier corridor wall
    Centering(Side),
    /// Blocked, already turning, or wall very close
    Avoidance,
    /// Nothing else matched
    Fallback,
}

/// Obstacle reading after smoothing against the session history
#[derive(Clone, Copy, Debug)]
struct ObstacleAnalysis {
    reading: ObstacleReading,
    diff: f32,
}

/// Decision engine that maps features and session memory to one command
#[derive(Debug, Clone)]
pub struct MovementController {
    config: NavigationConfig,
}

impl MovementController {
    /// Create a new controller with the given thresholds
    pub fn new(config: &NavigationConfig) -> Self {
        MovementController {
            config: config.clone(),
        }
    }

    /// Thresholds in use
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Decide the command for one frame and advance `state`.
    ///
    /// Total over its input: every reading produces exactly one command.
    pub fn decide(&self, features: &Features, state: &mut NavigationState) -> Command {
        state.frames_seen += 1;

        if let Some(command) = self.seek_target(&features.target, state) {
            debug!(
                "frame {}: target lock offset={:.3} area={:.4} -> {}",
                state.frames_seen, features.target.offset, features.target.area, command
            );
            return command;
        }

        let analysis = self.analyze_obstacles(&features.obstacles, state);
        self.update_turn_direction(&analysis, state);

        let maneuver = self.classify(&analysis, state);
        let command = self.apply(maneuver, state);
        debug!(
            "frame {}: left={:.3} right={:.3} wall={:.3} diff={:.3} blocked={} dead_end={} osc={} turn={:?} -> {:?} {}",
            state.frames_seen,
            analysis.reading.left_ratio,
            analysis.reading.right_ratio,
            analysis.reading.wall_ratio,
            analysis.diff,
            analysis.reading.center_blocked,
            analysis.reading.is_dead_end,
            state.oscillation_counter,
            state.last_turn_direction,
            maneuver,
            command
        );
        command
    }

    /// Target lock overrides every obstacle rule and interrupts any maneuver
    fn seek_target(&self, target: &TargetReading, state: &mut NavigationState) -> Option<Command> {
        if !target.visible || target.area <= self.config.min_target_area {
            return None;
        }

        state.is_turning_maneuver = false;
        state.oscillation_counter = 0;

        let tolerance = self.config.target_align_tolerance;
        let command = if target.offset > tolerance {
            state.last_turn_direction = Side::Right;
            Command::TurnRightFine
        } else if target.offset < -tolerance {
            state.last_turn_direction = Side::Left;
            Command::TurnLeftFine
        } else {
            Command::MoveForward
        };
        Some(command)
    }

    /// Smooth the wall diff and track left-right flapping
    fn analyze_obstacles(&self, reading: &ObstacleReading, state: &mut NavigationState) -> ObstacleAnalysis {
        let diff = state.push_diff(reading.diff);
        let side = Side::from_diff(diff, self.config.side_dead_band);
        state.track_oscillation(side);
        trace!("smoothed diff {:.3} ({:?}), oscillation {}", diff, side, state.oscillation_counter);

        ObstacleAnalysis {
            reading: *reading,
            diff,
        }
    }

    /// Prefer the more open side; a dead end with no preference turns right
    fn update_turn_direction(&self, analysis: &ObstacleAnalysis, state: &mut NavigationState) {
        let reading = &analysis.reading;
        if !reading.is_dead_end {
            let deadzone = self.config.centering_deadzone;
            if reading.left_ratio > reading.right_ratio + deadzone {
                state.last_turn_direction = Side::Right;
            } else if reading.right_ratio > reading.left_ratio + deadzone {
                state.last_turn_direction = Side::Left;
            }
        } else if state.last_turn_direction == Side::None {
            state.last_turn_direction = Side::Right;
        }
    }

    /// Pick the first applicable maneuver; branch order is significant
    fn classify(&self, analysis: &ObstacleAnalysis, state: &NavigationState) -> Maneuver {
        let cfg = &self.config;
        let reading = &analysis.reading;
        let path_clear = !reading.center_blocked;

        if path_clear && analysis.diff.abs() < cfg.heading_aligned_diff {
            return Maneuver::ClearPath;
        }

        if reading.is_dead_end {
            return Maneuver::DeadEnd;
        }

        if path_clear && state.oscillation_counter > cfg.oscillation_limit {
            return Maneuver::OscillationRelief;
        }

        if path_clear && reading.wall_ratio > cfg.centering_min_wall_ratio {
            // More wall on the right pushes the agent left, and vice versa.
            if analysis.diff > cfg.centering_correction {
                return Maneuver::Centering(Side::Left);
            }
            if analysis.diff < -cfg.centering_correction {
                return Maneuver::Centering(Side::Right);
            }
        }

        let wall_too_close = reading.wall_ratio >= cfg.wall_very_close_ratio;
        if reading.center_blocked || state.is_turning_maneuver || wall_too_close {
            return Maneuver::Avoidance;
        }

        Maneuver::Fallback
    }

    /// Apply the state side effects of a maneuver and produce its command
    fn apply(&self, maneuver: Maneuver, state: &mut NavigationState) -> Command {
        match maneuver {
            Maneuver::ClearPath => {
                state.is_turning_maneuver = false;
                Command::MoveForward
            }
            Maneuver::DeadEnd | Maneuver::Avoidance => {
                state.is_turning_maneuver = true;
                Command::sharp_toward(state.last_turn_direction)
            }
            Maneuver::OscillationRelief => {
                state.oscillation_counter = 0;
                state.is_turning_maneuver = false;
                Command::MoveForward
            }
            Maneuver::Centering(Side::Left) => Command::TurnLeftFine,
            Maneuver::Centering(_) => Command::TurnRightFine,
            Maneuver::Fallback => Command::MoveForward,
        }
    }
}
