//! Control channel client
//!
//! Thin framed request/response wrapper used by the CLI and the integration
//! tests. One request at a time; a response that takes longer than 5 seconds
//! closes the connection.

use super::framer::{encode_frame, Framer};
use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

/// Per-request response deadline
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Framed request/response client for the control channel
pub struct ControlClient {
    stream: TcpStream,
}

impl ControlClient {
    /// Connect to a control server.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_read_timeout(Some(Duration::from_millis(100)))?;
        Ok(ControlClient { stream })
    }

    /// Send one command and wait for its framed response.
    pub fn send_command(&mut self, command: &str) -> Result<String> {
        self.stream.write_all(&encode_frame(command.as_bytes()))?;

        let deadline = Instant::now() + RESPONSE_TIMEOUT;
        let mut framer = Framer::new();
        let mut buf = [0u8; 4096];

        loop {
            if Instant::now() >= deadline {
                let _ = self.stream.shutdown(std::net::Shutdown::Both);
                return Err(Error::Control("response timeout".to_string()));
            }

            match self.stream.read(&mut buf) {
                Ok(0) => {
                    return Err(Error::Control("connection closed by server".to_string()));
                }
                Ok(n) => {
                    framer.feed(&buf[..n]);
                    if let Some(frame) = framer.pop_frame() {
                        return Ok(String::from_utf8_lossy(&frame).into_owned());
                    }
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}
