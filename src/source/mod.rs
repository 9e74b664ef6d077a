//! Frame sources
//!
//! The ingest loop consumes one capability: `receive(&mut buf) -> bool`.
//! There are exactly two providers — the live UDP socket and the replay
//! reader — so the seam is a sum type rather than a trait object.

mod replay;
mod udp;

pub use replay::ReplayFrameSource;
pub use udp::{UdpFrameSink, UdpFrameSource};

/// Where the ingest loop gets its frames from
pub enum FrameSource {
    Udp(UdpFrameSource),
    Replay(ReplayFrameSource),
}

impl FrameSource {
    /// Receive one frame. `false` means timeout, transient error, or (for
    /// replay) end of stream.
    pub fn receive(&mut self, buf: &mut Vec<u8>) -> bool {
        match self {
            FrameSource::Udp(src) => src.receive(buf),
            FrameSource::Replay(src) => src.receive(buf),
        }
    }

    /// True when a replay stream is exhausted. Live sources never finish.
    pub fn is_done(&self) -> bool {
        match self {
            FrameSource::Udp(_) => false,
            FrameSource::Replay(src) => src.is_done(),
        }
    }
}
