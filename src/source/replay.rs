//! Replay of recorded frame streams
//!
//! Reads back the `(rx_ts_ns, length, bytes)` tuples written by the
//! recorder and hands them to the ingest loop as if they had just arrived.
//! With a nonzero speed multiplier the reader sleeps so that inter-frame
//! offsets (relative to the first frame) match wall-clock elapsed divided by
//! the multiplier; a multiplier of zero replays as fast as possible.

use crate::error::Result;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};

/// Plays a recording back through the frame-source interface
pub struct ReplayFrameSource {
    reader: BufReader<File>,
    speed: f64,
    frames_replayed: u64,
    done: bool,
    /// Timestamp of the first tuple and the wall-clock instant it was
    /// returned; pacing is computed against these.
    pacing_origin: Option<(u64, Instant)>,
}

impl ReplayFrameSource {
    /// Open a recording. Replays at real time (1.0) until `set_speed`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(ReplayFrameSource {
            reader: BufReader::new(file),
            speed: 1.0,
            frames_replayed: 0,
            done: false,
            pacing_origin: None,
        })
    }

    /// Playback speed multiplier: 1.0 = recorded pace, 2.0 = twice as fast,
    /// 0.0 = no pacing.
    pub fn set_speed(&mut self, multiplier: f64) {
        self.speed = multiplier;
    }

    /// True once the last tuple has been returned or a read failed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn frames_replayed(&self) -> u64 {
        self.frames_replayed
    }

    /// Read the next tuple into `buf`, sleeping first if pacing is on.
    /// Returns `false` at end of stream or on a short read.
    pub fn receive(&mut self, buf: &mut Vec<u8>) -> bool {
        buf.clear();
        if self.done {
            return false;
        }

        let mut ts_bytes = [0u8; 8];
        if self.reader.read_exact(&mut ts_bytes).is_err() {
            self.done = true;
            return false;
        }
        let ts_ns = u64::from_ne_bytes(ts_bytes);

        let mut len_bytes = [0u8; 4];
        if self.reader.read_exact(&mut len_bytes).is_err() {
            self.done = true;
            return false;
        }
        let len = u32::from_ne_bytes(len_bytes) as usize;

        buf.resize(len, 0);
        if len > 0 && self.reader.read_exact(buf).is_err() {
            self.done = true;
            buf.clear();
            return false;
        }

        if self.speed > 0.0 {
            match self.pacing_origin {
                None => {
                    self.pacing_origin = Some((ts_ns, Instant::now()));
                }
                Some((first_ts, started)) => {
                    let offset_ns = ts_ns.saturating_sub(first_ts);
                    let target = Duration::from_nanos((offset_ns as f64 / self.speed) as u64);
                    let elapsed = started.elapsed();
                    if target > elapsed {
                        std::thread::sleep(target - elapsed);
                    }
                }
            }
        }

        self.frames_replayed += 1;

        // Peek ahead so is_done() flips as the last tuple is handed out.
        match self.reader.fill_buf() {
            Ok(remaining) if remaining.is_empty() => self.done = true,
            Ok(_) => {}
            Err(_) => self.done = true,
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::FrameRecorder;
    use tempfile::TempDir;

    fn write_recording(path: &std::path::Path, frames: &[(u64, Vec<u8>)]) {
        let mut recorder = FrameRecorder::new();
        recorder.open(path).unwrap();
        for (ts, frame) in frames {
            recorder.record(*ts, frame).unwrap();
        }
        recorder.close();
    }

    #[test]
    fn test_replays_recorded_tuples() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.bin");
        write_recording(
            &path,
            &[(100, vec![1, 2, 3]), (200, vec![]), (300, vec![4, 5])],
        );

        let mut replay = ReplayFrameSource::open(&path).unwrap();
        replay.set_speed(0.0);

        let mut buf = Vec::new();
        assert!(replay.receive(&mut buf));
        assert_eq!(buf, vec![1, 2, 3]);
        assert!(!replay.is_done());

        assert!(replay.receive(&mut buf));
        assert!(buf.is_empty());

        assert!(replay.receive(&mut buf));
        assert_eq!(buf, vec![4, 5]);
        assert!(replay.is_done());
        assert_eq!(replay.frames_replayed(), 3);

        assert!(!replay.receive(&mut buf));
    }

    #[test]
    fn test_empty_recording_is_done_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");
        write_recording(&path, &[]);

        let mut replay = ReplayFrameSource::open(&path).unwrap();
        let mut buf = Vec::new();
        assert!(!replay.receive(&mut buf));
        assert!(replay.is_done());
    }

    #[test]
    fn test_truncated_tail_marks_done() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("torn.bin");
        write_recording(&path, &[(100, vec![1, 2, 3])]);

        // Append a torn tuple: timestamp + length, but only half the bytes.
        use std::io::Write;
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(&200u64.to_ne_bytes()).unwrap();
        f.write_all(&4u32.to_ne_bytes()).unwrap();
        f.write_all(&[9, 9]).unwrap();
        drop(f);

        let mut replay = ReplayFrameSource::open(&path).unwrap();
        replay.set_speed(0.0);

        let mut buf = Vec::new();
        assert!(replay.receive(&mut buf));
        assert_eq!(buf, vec![1, 2, 3]);

        assert!(!replay.receive(&mut buf));
        assert!(replay.is_done());
        assert_eq!(replay.frames_replayed(), 1);
    }

    #[test]
    fn test_paced_replay_spaces_frames() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paced.bin");
        // 60 ms between frames.
        write_recording(&path, &[(0, vec![1]), (60_000_000, vec![2])]);

        let mut replay = ReplayFrameSource::open(&path).unwrap();
        replay.set_speed(2.0); // halves the spacing

        let mut buf = Vec::new();
        let start = Instant::now();
        assert!(replay.receive(&mut buf));
        assert!(replay.receive(&mut buf));
        let elapsed = start.elapsed();

        // 60 ms / 2.0 = 30 ms floor (scheduling may add slack).
        assert!(elapsed >= Duration::from_millis(25), "elapsed {:?}", elapsed);
    }
}
