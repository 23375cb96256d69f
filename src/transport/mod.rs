//! Simulator link for Labyrinth
//!
//! This module handles all communication with the simulated agent:
//! - Reading length-prefixed camera frames
//! - Writing one command line per frame
//! - Running one session per connection and accepting connections

mod frame;
mod server;
mod session;
mod wire;

pub use frame::{decode_frame, write_command, FrameReader};
pub use server::Server;
pub use session::{Session, SessionSummary};
pub use wire::WireCommand;

use serde::{Deserialize, Serialize};

/// Default limit on a single frame payload (8 MiB)
pub const DEFAULT_MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// TCP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on, e.g. `127.0.0.1:5000`
    pub bind_address: String,
    /// Frames announcing a larger payload end the session
    pub max_frame_bytes: usize,
    /// Socket read timeout; a silent simulator ends the session
    pub read_timeout_ms: Option<u64>,
    /// Send `RESET` after this many frames in one episode
    pub episode_frame_limit: Option<u64>,
    /// Accept loop poll interval while idle
    pub accept_poll_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1:5000".to_string(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            read_timeout_ms: None,
            episode_frame_limit: None,
            accept_poll_ms: 50,
        }
    }
}
