//! UDP datagram source and sink
//!
//! One telemetry frame per datagram. The source receives with a bounded
//! timeout so the ingest loop can observe its stop flag; the sink is a
//! connected datagram sender used by the simulator and the replay tool.

use crate::error::{Error, Result};
use std::net::UdpSocket;
use std::time::Duration;

/// Largest datagram we will accept
const MAX_DATAGRAM: usize = 65_536;

/// Receives telemetry datagrams on a bound local port
pub struct UdpFrameSource {
    socket: UdpSocket,
}

impl UdpFrameSource {
    /// Bind to `0.0.0.0:port` with a 100 ms receive timeout.
    pub fn bind(port: u16) -> Result<Self> {
        let addr = format!("0.0.0.0:{}", port);
        let socket = UdpSocket::bind(&addr).map_err(|e| Error::Bind(addr, e))?;
        socket.set_read_timeout(Some(Duration::from_millis(100)))?;
        Ok(UdpFrameSource { socket })
    }

    /// Change the receive timeout. Zero means block indefinitely.
    pub fn set_timeout(&self, timeout: Duration) -> Result<()> {
        let t = if timeout.is_zero() { None } else { Some(timeout) };
        self.socket.set_read_timeout(t)?;
        Ok(())
    }

    /// Local address after binding (useful with port 0 in tests).
    pub fn local_port(&self) -> Result<u16> {
        Ok(self.socket.local_addr()?.port())
    }

    /// Receive one datagram into `buf`. Returns `false` on timeout or a
    /// transient socket error.
    pub fn receive(&mut self, buf: &mut Vec<u8>) -> bool {
        buf.resize(MAX_DATAGRAM, 0);
        match self.socket.recv_from(buf) {
            Ok((n, _src)) => {
                buf.truncate(n);
                true
            }
            Err(e) => {
                if !matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) {
                    log::debug!("UDP receive error: {}", e);
                }
                buf.clear();
                false
            }
        }
    }
}

/// Sends telemetry datagrams to a fixed destination
pub struct UdpFrameSink {
    socket: UdpSocket,
}

impl UdpFrameSink {
    /// Create a sender with `host:port` as the default destination.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let socket =
            UdpSocket::bind("0.0.0.0:0").map_err(|e| Error::Bind("0.0.0.0:0".into(), e))?;
        socket.connect((host, port))?;
        Ok(UdpFrameSink { socket })
    }

    /// Send one datagram. Returns `true` when the whole frame went out.
    pub fn send(&self, frame: &[u8]) -> bool {
        if frame.is_empty() {
            return false;
        }
        match self.socket.send(frame) {
            Ok(n) => n == frame.len(),
            Err(e) => {
                log::debug!("UDP send error: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_datagram() {
        let mut source = UdpFrameSource::bind(0).unwrap();
        let port = source.local_port().unwrap();
        let sink = UdpFrameSink::connect("127.0.0.1", port).unwrap();

        assert!(sink.send(&[1, 2, 3, 4]));

        let mut buf = Vec::new();
        // A couple of retries in case the datagram is slow to arrive.
        let mut got = false;
        for _ in 0..20 {
            if source.receive(&mut buf) {
                got = true;
                break;
            }
        }
        assert!(got);
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_receive_times_out() {
        let mut source = UdpFrameSource::bind(0).unwrap();
        source.set_timeout(Duration::from_millis(20)).unwrap();
        let mut buf = Vec::new();
        assert!(!source.receive(&mut buf));
        assert!(buf.is_empty());
    }
}
