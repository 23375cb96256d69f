// src/transport/session.rs
// One simulator connection: read a frame, decide, answer, repeat.
// Each session owns its NavigationState; nothing is shared between sessions.

use super::frame::{decode_frame, write_command, FrameReader};
use super::WireCommand;
use crate::navigation::{Command, CommandProfile, MovementController, NavigationState};
use crate::perception::FeatureExtractor;
use crate::{LabyrinthConfig, Result};
use log::{error, info, warn};
use std::io::{Read, Write};

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames received
    pub frames: u64,
    /// Frames whose payload was not a decodable image
    pub decode_failures: u64,
    /// `RESET` commands sent
    pub resets: u64,
}

/// Frame loop for a single connected agent
pub struct Session<S, E> {
    frames: FrameReader<S>,
    extractor: E,
    controller: MovementController,
    state: NavigationState,
    profile: CommandProfile,
    episode_frame_limit: Option<u64>,
    episode_frames: u64,
    reset_pending: bool,
    summary: SessionSummary,
    label: String,
}

impl<S: Read + Write, E: FeatureExtractor> Session<S, E> {
    /// Start a session on `stream` with a zeroed navigation state
    pub fn new(stream: S, extractor: E, config: &LabyrinthConfig) -> Self {
        Session {
            frames: FrameReader::new(stream, config.server.max_frame_bytes),
            extractor,
            controller: MovementController::new(&config.navigation),
            state: NavigationState::new(),
            profile: config.commands.clone(),
            episode_frame_limit: config.server.episode_frame_limit,
            episode_frames: 0,
            reset_pending: false,
            summary: SessionSummary::default(),
            label: "session".to_string(),
        }
    }

    /// Name used in log lines, typically the peer address
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Answer the next frame with `RESET` and clear the navigation state
    pub fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    /// Current navigation memory
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Counters so far
    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Process one frame. Returns the command sent, or `None` once the
    /// stream has ended.
    pub fn step(&mut self) -> Result<Option<WireCommand>> {
        let reset = self.reset_due();
        let decoded = match self.frames.read_frame()? {
            Some(payload) if !reset => Some(decode_frame(payload)),
            Some(_) => None,
            None => return Ok(None),
        };
        self.summary.frames += 1;

        let reply = match decoded {
            None => {
                self.reset_episode();
                WireCommand::Reset
            }
            Some(Ok(image)) => {
                let features = self.extractor.extract(&image);
                let command = self.controller.decide(&features, &mut self.state);
                self.episode_frames += 1;
                WireCommand::from_command(command, &self.profile)
            }
            Some(Err(e)) => {
                self.summary.decode_failures += 1;
                warn!("{}: frame {} not decodable ({}), searching", self.label, self.summary.frames, e);
                WireCommand::from_command(Command::searching(), &self.profile)
            }
        };

        write_command(self.frames.get_mut(), &reply)?;
        Ok(Some(reply))
    }

    /// Run until the peer disconnects
    pub fn run(&mut self) -> Result<SessionSummary> {
        info!("{}: session started", self.label);
        loop {
            match self.step() {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    error!("{}: session aborted after {} frames: {}", self.label, self.summary.frames, e);
                    return Err(e);
                }
            }
        }
        info!(
            "{}: session ended after {} frames ({} undecodable, {} resets)",
            self.label, self.summary.frames, self.summary.decode_failures, self.summary.resets
        );
        Ok(self.summary)
    }

    /// Give back the underlying stream
    pub fn into_stream(self) -> S {
        self.frames.into_inner()
    }

    fn reset_due(&self) -> bool {
        self.reset_pending
            || self
                .episode_frame_limit
                .is_some_and(|limit| self.episode_frames >= limit)
    }

    fn reset_episode(&mut self) {
        info!(
            "{}: resetting agent after {} frames in episode",
            self.label, self.episode_frames
        );
        self.state.reset();
        self.reset_pending = false;
        self.episode_frames = 0;
        self.summary.resets += 1;
    }
}
