//! Control channel server
//!
//! Listens on TCP, one worker thread per client connection. Each connection
//! runs its own framer; requests dispatch sequentially within a connection,
//! so a slow client only stalls itself. `stop()` flips the shutdown flag and
//! joins everything; the accept loop and every worker poll the flag on a
//! 100 ms cadence, keeping shutdown well inside the 2-second bound.

mod client;
mod framer;
mod handler;

pub use client::ControlClient;
pub use framer::{encode_frame, Framer, MAX_FRAME_LEN};
pub use handler::CommandHandler;

use crate::error::{Error, Result};
use crate::gateway::StatsAggregator;
use crate::journal::EventJournal;
use parking_lot::Mutex;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Accepts control clients and dispatches their commands
pub struct ControlServer {
    handler: Arc<Mutex<CommandHandler>>,
    shutdown: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
    local_port: Option<u16>,
    running: bool,
}

impl ControlServer {
    pub fn new(
        stats: Arc<StatsAggregator>,
        journal: Arc<EventJournal>,
        crc_enabled: Arc<AtomicBool>,
    ) -> Self {
        ControlServer {
            handler: Arc::new(Mutex::new(CommandHandler::new(stats, journal, crc_enabled))),
            shutdown: Arc::new(AtomicBool::new(false)),
            accept_thread: None,
            workers: Arc::new(Mutex::new(Vec::new())),
            local_port: None,
            running: false,
        }
    }

    /// Bind the listener and spawn the accept thread. A bind failure is
    /// fatal and returned to the caller.
    pub fn start(&mut self, port: u16) -> Result<()> {
        if self.running {
            return Ok(());
        }

        let addr = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&addr).map_err(|e| Error::Bind(addr, e))?;
        listener.set_nonblocking(true)?;
        self.local_port = Some(listener.local_addr()?.port());

        self.shutdown.store(false, Ordering::SeqCst);
        let shutdown = Arc::clone(&self.shutdown);
        let handler = Arc::clone(&self.handler);
        let workers = Arc::clone(&self.workers);

        let accept_thread = std::thread::Builder::new()
            .name("control-accept".to_string())
            .spawn(move || accept_loop(listener, handler, workers, shutdown))?;

        self.accept_thread = Some(accept_thread);
        self.running = true;
        log::info!("Control server listening on port {}", self.port());
        Ok(())
    }

    /// Actual bound port (useful when started with port 0).
    pub fn port(&self) -> u16 {
        self.local_port.unwrap_or(0)
    }

    /// Shared command handler (introspection and tests).
    pub fn handler(&self) -> Arc<Mutex<CommandHandler>> {
        Arc::clone(&self.handler)
    }

    /// Stop accepting, drain client workers, and join them all.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.shutdown.store(true, Ordering::SeqCst);

        if let Some(t) = self.accept_thread.take() {
            let _ = t.join();
        }
        let drained: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        for t in drained {
            let _ = t.join();
        }

        self.running = false;
        log::info!("Control server stopped");
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(
    listener: TcpListener,
    handler: Arc<Mutex<CommandHandler>>,
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
    shutdown: Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, addr)) => {
                log::info!("Control client connected: {}", addr);
                if stream
                    .set_read_timeout(Some(Duration::from_millis(100)))
                    .is_err()
                {
                    continue;
                }
                let handler = Arc::clone(&handler);
                let shutdown = Arc::clone(&shutdown);
                let spawned = std::thread::Builder::new()
                    .name("control-client".to_string())
                    .spawn(move || client_loop(stream, handler, shutdown));
                match spawned {
                    Ok(t) => workers.lock().push(t),
                    Err(e) => log::error!("Failed to spawn control worker: {}", e),
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) => {
                log::error!("Control accept error: {}", e);
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

fn client_loop(
    mut stream: TcpStream,
    handler: Arc<Mutex<CommandHandler>>,
    shutdown: Arc<AtomicBool>,
) {
    let mut framer = Framer::new();
    let mut buf = [0u8; 4096];

    while !shutdown.load(Ordering::Relaxed) {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                framer.feed(&buf[..n]);
                while let Some(frame) = framer.pop_frame() {
                    let command = String::from_utf8_lossy(&frame);
                    let response = handler.lock().handle(&command);
                    if stream.write_all(&encode_frame(response.as_bytes())).is_err() {
                        return;
                    }
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(_) => break,
        }
    }

    if let Ok(addr) = stream.peer_addr() {
        log::info!("Control client disconnected: {}", addr);
    }
}
