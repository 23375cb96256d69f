// src/transport/wire.rs
// Text commands understood by the simulator: one ASCII line each.
//   MOVE <speed>      1 cruise, 0 stop
//   ROTATE <degrees>  negative = left, positive = right
//   RESET             return the agent to its start pose

use crate::navigation::{Command, CommandProfile};
use crate::{LabyrinthError, Result};
use std::fmt;
use std::str::FromStr;

/// One line of the command channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireCommand {
    /// Drive at the given speed
    Move(i32),
    /// Rotate in place by signed degrees
    Rotate(i32),
    /// Restart the episode
    Reset,
}

impl WireCommand {
    /// Render a symbolic command with the profile's magnitudes
    pub fn from_command(command: Command, profile: &CommandProfile) -> Self {
        match command {
            Command::MoveForward => WireCommand::Move(profile.forward_speed),
            Command::Stop => WireCommand::Move(0),
            Command::TurnLeftFine => WireCommand::Rotate(-profile.fine_turn_degrees),
            Command::TurnRightFine => WireCommand::Rotate(profile.fine_turn_degrees),
            Command::TurnLeftSharp => WireCommand::Rotate(-profile.sharp_turn_degrees),
            Command::TurnRightSharp => WireCommand::Rotate(profile.sharp_turn_degrees),
        }
    }
}

impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WireCommand::Move(speed) => writeln!(f, "MOVE {}", speed),
            WireCommand::Rotate(degrees) => writeln!(f, "ROTATE {}", degrees),
            WireCommand::Reset => writeln!(f, "RESET"),
        }
    }
}

impl FromStr for WireCommand {
    type Err = LabyrinthError;

    fn from_str(line: &str) -> Result<Self> {
        let invalid = || LabyrinthError::InvalidCommand(line.to_string());
        let trimmed = line.strip_suffix('\n').unwrap_or(line);
        let mut parts = trimmed.split(' ');

        let command = match (parts.next(), parts.next()) {
            (Some("MOVE"), Some(arg)) => WireCommand::Move(arg.parse().map_err(|_| invalid())?),
            (Some("ROTATE"), Some(arg)) => WireCommand::Rotate(arg.parse().map_err(|_| invalid())?),
            (Some("RESET"), None) => WireCommand::Reset,
            _ => return Err(invalid()),
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Command::MoveForward, "MOVE 1\n")]
    #[case(Command::Stop, "MOVE 0\n")]
    #[case(Command::TurnLeftFine, "ROTATE -5\n")]
    #[case(Command::TurnRightFine, "ROTATE 5\n")]
    #[case(Command::TurnLeftSharp, "ROTATE -10\n")]
    #[case(Command::TurnRightSharp, "ROTATE 10\n")]
    fn renders_default_profile(#[case] command: Command, #[case] line: &str) {
        let wire = WireCommand::from_command(command, &CommandProfile::default());
        assert_eq!(wire.to_string(), line);
    }

    #[test]
    fn custom_sharp_magnitude() {
        let profile = CommandProfile {
            sharp_turn_degrees: 20,
            ..CommandProfile::default()
        };
        assert_eq!(
            WireCommand::from_command(Command::TurnLeftSharp, &profile),
            WireCommand::Rotate(-20)
        );
    }

    #[rstest]
    #[case("MOVE 1\n", WireCommand::Move(1))]
    #[case("ROTATE -10", WireCommand::Rotate(-10))]
    #[case("RESET\n", WireCommand::Reset)]
    fn parses_lines(#[case] line: &str, #[case] expected: WireCommand) {
        assert_eq!(line.parse::<WireCommand>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("MOVE")]
    #[case("MOVE fast\n")]
    #[case("ROTATE 5 5\n")]
    #[case("RESET now\n")]
    #[case("JUMP 1\n")]
    fn rejects_unknown_lines(#[case] line: &str) {
        assert!(matches!(line.parse::<WireCommand>(), Err(LabyrinthError::InvalidCommand(_))));
    }
}
