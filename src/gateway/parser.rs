//! Telemetry frame parser
//!
//! Validates one datagram's bytes into a [`ParsedFrame`]. All reads are
//! bounds-checked slice accesses; the parser never touches bytes outside the
//! input. The payload is a borrow into the input buffer, so a frame cannot
//! outlive the datagram it was parsed from.

use crate::protocol::{
    crc32, decode_header, MsgType, TelemetryHeader, FRAME_CRC_SIZE, FRAME_HEADER_SIZE,
    MAX_PAYLOAD_SIZE, PROTOCOL_VERSION,
};
use thiserror::Error;

/// Frame rejection reasons, in priority order of detection
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("frame shorter than header")]
    TooShort,
    #[error("unsupported protocol version")]
    BadVersion,
    #[error("unknown message type")]
    BadMsgType,
    #[error("declared payload length exceeds maximum")]
    PayloadTooLong,
    #[error("frame shorter than declared length")]
    Truncated,
    #[error("CRC mismatch")]
    CrcMismatch,
}

impl ParseError {
    /// Wire-style token used in event details
    pub fn code(self) -> &'static str {
        match self {
            ParseError::TooShort => "TOO_SHORT",
            ParseError::BadVersion => "BAD_VERSION",
            ParseError::BadMsgType => "BAD_MSG_TYPE",
            ParseError::PayloadTooLong => "PAYLOAD_TOO_LONG",
            ParseError::Truncated => "TRUNCATED",
            ParseError::CrcMismatch => "CRC_MISMATCH",
        }
    }
}

/// A validated frame borrowing its payload from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedFrame<'a> {
    pub header: TelemetryHeader,
    pub payload: &'a [u8],
    pub crc: u32,
    pub has_crc: bool,
}

/// Validate a raw datagram.
///
/// With `crc_enabled`, a little-endian CRC-32 over `header ‖ payload` must
/// follow the payload. Trailing bytes beyond the expected length are
/// tolerated and ignored.
pub fn parse_frame(buf: &[u8], crc_enabled: bool) -> Result<ParsedFrame<'_>, ParseError> {
    if buf.len() < FRAME_HEADER_SIZE {
        return Err(ParseError::TooShort);
    }

    // decode_header cannot fail past the length check above
    let header = decode_header(buf).ok_or(ParseError::TooShort)?;

    if header.version != PROTOCOL_VERSION {
        return Err(ParseError::BadVersion);
    }

    if MsgType::from_wire(header.msg_type).is_none() {
        return Err(ParseError::BadMsgType);
    }

    let payload_len = header.payload_len as usize;
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(ParseError::PayloadTooLong);
    }

    let mut expected = FRAME_HEADER_SIZE + payload_len;
    if crc_enabled {
        expected += FRAME_CRC_SIZE;
    }
    if buf.len() < expected {
        return Err(ParseError::Truncated);
    }

    let payload = &buf[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + payload_len];

    let (crc, has_crc) = if crc_enabled {
        let crc_offset = FRAME_HEADER_SIZE + payload_len;
        let stored = u32::from_le_bytes([
            buf[crc_offset],
            buf[crc_offset + 1],
            buf[crc_offset + 2],
            buf[crc_offset + 3],
        ]);
        let computed = crc32(&buf[..crc_offset]);
        if computed != stored {
            return Err(ParseError::CrcMismatch);
        }
        (stored, true)
    } else {
        (0, false)
    };

    Ok(ParsedFrame {
        header,
        payload,
        crc,
        has_crc,
    })
}
