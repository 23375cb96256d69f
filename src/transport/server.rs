// src/transport/server.rs
// TCP accept loop. Every accepted simulator connection gets its own worker
// thread, extractor and navigation state.

use super::session::Session;
use crate::perception::ColorFeatureExtractor;
use crate::{LabyrinthConfig, LabyrinthError, Result};
use log::{error, info, warn};
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Listening socket plus the configuration handed to each session
pub struct Server {
    listener: TcpListener,
    config: LabyrinthConfig,
}

impl Server {
    /// Bind to `config.server.bind_address`
    pub fn bind(config: &LabyrinthConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.server.bind_address)?;
        listener.set_nonblocking(true)?;
        Ok(Server {
            listener,
            config: config.clone(),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `running` is cleared
    pub fn run(&self, running: Arc<AtomicBool>) -> Result<()> {
        info!("Server listening on {}", self.local_addr()?);
        let poll = Duration::from_millis(self.config.server.accept_poll_ms.max(1));
        let mut workers: Vec<JoinHandle<()>> = Vec::new();
        let mut next_id = 0u64;

        while running.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    next_id += 1;
                    info!("Agent connected from {} (session {})", addr, next_id);
                    match self.spawn_session(stream, addr, next_id) {
                        Ok(handle) => workers.push(handle),
                        Err(e) => error!("Failed to start session for {}: {}", addr, e),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(poll),
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    thread::sleep(poll);
                }
            }
            workers.retain(|handle| !handle.is_finished());
        }

        info!("Server stopping with {} active sessions", workers.len());
        Ok(())
    }

    fn spawn_session(&self, stream: TcpStream, addr: SocketAddr, id: u64) -> Result<JoinHandle<()>> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(self.config.server.read_timeout_ms.map(Duration::from_millis))?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to disable Nagle for {}: {}", addr, e);
        }

        let extractor = ColorFeatureExtractor::new(&self.config.vision, &self.config.navigation);
        let config = self.config.clone();
        thread::Builder::new()
            .name(format!("session-{}", id))
            .spawn(move || {
                let mut session = Session::new(stream, extractor, &config).named(addr.to_string());
                // Errors are logged by the session itself.
                let _ = session.run();
            })
            .map_err(LabyrinthError::Io)
    }
}
