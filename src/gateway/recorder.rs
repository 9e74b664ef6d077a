//! Raw frame recorder
//!
//! Appends `(rx_ts_ns: u64, length: u32, bytes)` tuples to a file for later
//! replay. The integers are host-endian: recordings are consumed on the host
//! that produced them, and the replay source reads them back the same way.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends received frames to a recording file
#[derive(Default)]
pub struct FrameRecorder {
    writer: Option<BufWriter<File>>,
    frame_count: u64,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (truncating) a recording file. Any previously open file is
    /// closed first.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.close();
        let file = File::create(path)?;
        self.writer = Some(BufWriter::new(file));
        self.frame_count = 0;
        Ok(())
    }

    /// Append one tuple. Zero-length frames are legal. Recording to a closed
    /// handle fails without side effects.
    pub fn record(&mut self, rx_ts_ns: u64, frame: &[u8]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::RecorderClosed)?;
        writer.write_all(&rx_ts_ns.to_ne_bytes())?;
        writer.write_all(&(frame.len() as u32).to_ne_bytes())?;
        writer.write_all(frame)?;
        self.frame_count += 1;
        Ok(())
    }

    /// Flush and close. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Frames recorded since the last `open`.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Drop for FrameRecorder {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_tuples_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.bin");

        let mut recorder = FrameRecorder::new();
        recorder.open(&path).unwrap();
        recorder.record(1000, &[1, 2, 3]).unwrap();
        recorder.record(2000, &[4, 5]).unwrap();
        assert_eq!(recorder.frame_count(), 2);
        recorder.close();

        let bytes = std::fs::read(&path).unwrap();
        // (8 + 4 + 3) + (8 + 4 + 2)
        assert_eq!(bytes.len(), 29);
        assert_eq!(u64::from_ne_bytes(bytes[0..8].try_into().unwrap()), 1000);
        assert_eq!(u32::from_ne_bytes(bytes[8..12].try_into().unwrap()), 3);
        assert_eq!(&bytes[12..15], &[1, 2, 3]);
    }

    #[test]
    fn test_record_on_closed_handle_fails() {
        let mut recorder = FrameRecorder::new();
        assert!(matches!(
            recorder.record(0, &[1]),
            Err(Error::RecorderClosed)
        ));
        assert_eq!(recorder.frame_count(), 0);
    }

    #[test]
    fn test_zero_length_frame() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");

        let mut recorder = FrameRecorder::new();
        recorder.open(&path).unwrap();
        recorder.record(42, &[]).unwrap();
        recorder.close();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(u32::from_ne_bytes(bytes[8..12].try_into().unwrap()), 0);
    }

    #[test]
    fn test_reopen_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trunc.bin");

        let mut recorder = FrameRecorder::new();
        recorder.open(&path).unwrap();
        recorder.record(1, &[9; 100]).unwrap();
        recorder.open(&path).unwrap();
        assert_eq!(recorder.frame_count(), 0);
        recorder.close();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }
}
