//! Length-prefix framing for the control channel
//!
//! Requests and responses travel over a reliable byte stream as
//! `[4-byte big-endian length][payload]`. The decoder buffers partial reads
//! and yields whole payloads. A declared length above the safety cap means
//! the framing boundary is lost; the only sane recovery is to discard the
//! buffered stream and let the peer resynchronize or reconnect.

use std::collections::VecDeque;

/// Declared lengths above this discard the buffered stream
pub const MAX_FRAME_LEN: usize = 10 * 1024 * 1024;

/// Incremental decoder for length-prefixed frames
#[derive(Default)]
pub struct Framer {
    buffer: Vec<u8>,
    ready: VecDeque<Vec<u8>>,
}

/// Prepend the 4-byte big-endian length to a payload.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + payload.len());
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed received bytes; complete frames become available via
    /// `pop_frame`.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        self.extract();
    }

    fn extract(&mut self) {
        while self.buffer.len() >= 4 {
            let len = u32::from_be_bytes([
                self.buffer[0],
                self.buffer[1],
                self.buffer[2],
                self.buffer[3],
            ]) as usize;

            if len > MAX_FRAME_LEN {
                log::warn!(
                    "Control frame length {} exceeds cap, discarding {} buffered bytes",
                    len,
                    self.buffer.len()
                );
                self.buffer.clear();
                return;
            }

            if self.buffer.len() < 4 + len {
                return;
            }

            let payload = self.buffer[4..4 + len].to_vec();
            self.buffer.drain(..4 + len);
            self.ready.push_back(payload);
        }
    }

    pub fn has_frame(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Pop the oldest complete payload.
    pub fn pop_frame(&mut self) -> Option<Vec<u8>> {
        self.ready.pop_front()
    }

    /// Drop buffered bytes and pending frames.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.ready.clear();
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_prefixes_big_endian_length() {
        let frame = encode_frame(b"GET HEALTH");
        assert_eq!(&frame[..4], &[0, 0, 0, 10]);
        assert_eq!(&frame[4..], b"GET HEALTH");
    }

    #[test]
    fn test_whole_frame_round_trip() {
        let mut framer = Framer::new();
        framer.feed(&encode_frame(b"GET STATS"));
        assert!(framer.has_frame());
        assert_eq!(framer.pop_frame().unwrap(), b"GET STATS");
        assert!(!framer.has_frame());
    }

    #[test]
    fn test_byte_at_a_time_delivery() {
        let encoded = encode_frame(b"SET LOG_LEVEL=DEBUG");
        let mut framer = Framer::new();
        for byte in &encoded {
            assert!(!framer.has_frame() || framer.buffered_bytes() == 0);
            framer.feed(std::slice::from_ref(byte));
        }
        assert_eq!(framer.pop_frame().unwrap(), b"SET LOG_LEVEL=DEBUG");
    }

    #[test]
    fn test_arbitrary_splits_reassemble() {
        let encoded = encode_frame(b"GET HEALTH");
        for split in 1..encoded.len() {
            let mut framer = Framer::new();
            framer.feed(&encoded[..split]);
            framer.feed(&encoded[split..]);
            assert_eq!(framer.pop_frame().unwrap(), b"GET HEALTH", "split {}", split);
        }
    }

    #[test]
    fn test_multiple_frames_in_one_feed() {
        let mut bytes = encode_frame(b"A");
        bytes.extend_from_slice(&encode_frame(b"BB"));
        bytes.extend_from_slice(&encode_frame(b""));

        let mut framer = Framer::new();
        framer.feed(&bytes);
        assert_eq!(framer.pop_frame().unwrap(), b"A");
        assert_eq!(framer.pop_frame().unwrap(), b"BB");
        assert_eq!(framer.pop_frame().unwrap(), b"");
        assert!(framer.pop_frame().is_none());
    }

    #[test]
    fn test_oversized_length_discards_buffer() {
        let mut framer = Framer::new();
        let mut bytes = ((MAX_FRAME_LEN as u32) + 1).to_be_bytes().to_vec();
        bytes.extend_from_slice(b"garbage that should vanish");
        framer.feed(&bytes);

        assert!(!framer.has_frame());
        assert_eq!(framer.buffered_bytes(), 0);

        // The framer keeps working after the discard.
        framer.feed(&encode_frame(b"GET HEALTH"));
        assert_eq!(framer.pop_frame().unwrap(), b"GET HEALTH");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut framer = Framer::new();
        framer.feed(&encode_frame(b"ONE"));
        framer.feed(&[0, 0]);
        framer.reset();
        assert!(!framer.has_frame());
        assert_eq!(framer.buffered_bytes(), 0);
    }
}
