// src/transport/frame.rs
// Length-prefixed frame reading and command line writing.
//
// ┌──────────────────┬──────────────────────────┐
// │ Length (4 bytes) │ Payload (variable)       │
// │ Big-endian u32   │ Encoded still image      │
// └──────────────────┴──────────────────────────┘

use super::WireCommand;
use crate::{LabyrinthError, Result};
use image::RgbImage;
use log::debug;
use std::io::{ErrorKind, Read, Write};

/// Initial capacity for the payload buffer (a small compressed frame)
const INITIAL_BUFFER_CAPACITY: usize = 64 * 1024;

/// Reads frames from a byte stream into a reusable buffer
pub struct FrameReader<R> {
    reader: R,
    max_frame_bytes: usize,
    buffer: Vec<u8>,
}

impl<R: Read> FrameReader<R> {
    /// Wrap `reader`, rejecting payloads above `max_frame_bytes`
    pub fn new(reader: R, max_frame_bytes: usize) -> Self {
        FrameReader {
            reader,
            max_frame_bytes,
            buffer: Vec::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Read the next frame payload.
    ///
    /// Returns `Ok(None)` when the stream ends, including mid-prefix or
    /// mid-payload.
    pub fn read_frame(&mut self) -> Result<Option<&[u8]>> {
        let mut len_buf = [0u8; 4];
        match self.reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                debug!("stream closed before frame header");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > self.max_frame_bytes {
            return Err(LabyrinthError::FrameTooLarge {
                len,
                max: self.max_frame_bytes,
            });
        }

        self.buffer.clear();
        self.buffer.resize(len, 0);
        match self.reader.read_exact(&mut self.buffer) {
            Ok(()) => Ok(Some(self.buffer.as_slice())),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                debug!("stream closed inside a {} byte frame", len);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Access the underlying stream
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Write one command line and flush
pub fn write_command<W: Write>(writer: &mut W, command: &WireCommand) -> Result<()> {
    writer.write_all(command.to_string().as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Decode an encoded still image into RGB
pub fn decode_frame(payload: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(payload)?;
    Ok(image.to_rgb8())
}
