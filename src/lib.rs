//! Labyrinth - camera-driven maze navigation controller
//!
//! This library turns a stream of camera frames from a simulated agent into
//! discrete motor commands: a colour-segmentation feature extractor, a
//! stateful rule-based navigation engine, and the TCP frame transport that
//! connects both to the simulator.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod navigation;
pub mod perception;
pub mod transport;

// Re-export commonly used items for easier access
pub use navigation::{Command, CommandProfile, MovementController, NavigationConfig, NavigationState, Side};
pub use perception::{ColorFeatureExtractor, FeatureExtractor, Features, ObstacleReading, TargetReading, VisionConfig};
pub use transport::{Server, ServerConfig, Session, SessionSummary, WireCommand};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Main configuration structure for Labyrinth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabyrinthConfig {
    /// TCP server settings
    pub server: ServerConfig,
    /// Decision engine thresholds
    pub navigation: NavigationConfig,
    /// Colour segmentation and analysis band geometry
    pub vision: VisionConfig,
    /// Wire rendering of symbolic commands
    pub commands: CommandProfile,
    /// Logging defaults
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl LabyrinthConfig {
    /// Load configuration from a YAML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: LabyrinthConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Write configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    /// Reject settings that would make the controller or extractor misbehave
    pub fn validate(&self) -> Result<()> {
        self.navigation.validate()?;
        self.vision.validate()?;
        self.commands.validate()?;
        if self.server.max_frame_bytes == 0 {
            return Err(LabyrinthError::InvalidConfig(
                "server.max_frame_bytes must be positive".to_string(),
            ));
        }
        if self.server.read_timeout_ms == Some(0) {
            return Err(LabyrinthError::InvalidConfig(
                "server.read_timeout_ms must be positive; omit it to wait forever".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LabyrinthError>;

/// Labyrinth error types
#[derive(Debug, thiserror::Error)]
pub enum LabyrinthError {
    /// I/O error on a socket or file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Configuration parsed but holds unusable values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Frame length prefix above the configured limit
    #[error("Frame too large: {len} bytes (limit {max})")]
    FrameTooLarge {
        /// Announced payload length
        len: usize,
        /// Configured limit
        max: usize,
    },

    /// Frame payload is not a decodable image
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// Command line not in the wire vocabulary
    #[error("Invalid command: {0:?}")]
    InvalidCommand(String),
}
