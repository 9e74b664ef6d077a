//! Wire codec for telemetry frames
//!
//! Frame layout: `[header 18B] [payload] [crc32 4B when CRC mode is on]`.
//! Every multi-byte field is little-endian. Structs are encoded field by
//! field with explicit byte reads/writes; nothing here depends on in-memory
//! struct layout.

/// Telemetry frame header (18 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryHeader {
    pub version: u8,
    pub msg_type: u8,
    pub src_id: u16,
    pub seq: u32,
    pub ts_ns: u64,
    pub payload_len: u16,
}

impl TelemetryHeader {
    pub const WIRE_SIZE: usize = 18;
}

/// Raw sensor detection (21 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlotPayload {
    pub plot_id: u32,
    pub azimuth_mdeg: i32,
    pub elevation_mdeg: i32,
    pub range_m: u32,
    pub amplitude_db: i16,
    pub doppler_mps: i16,
    pub quality: u8,
}

impl PlotPayload {
    pub const WIRE_SIZE: usize = 21;
}

/// Correlated track (25 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackPayload {
    pub track_id: u32,
    pub classification: u8,
    pub threat_level: u8,
    pub iff_status: u8,
    pub azimuth_mdeg: i32,
    pub elevation_mdeg: i32,
    pub range_m: u32,
    pub velocity_mps: i16,
    pub rcs_dbsm: i16,
    pub update_count: u16,
}

impl TrackPayload {
    pub const WIRE_SIZE: usize = 25;
}

/// Subsystem heartbeat (11 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartbeatPayload {
    pub subsystem_id: u16,
    pub state: u8,
    pub cpu_pct: u8,
    pub mem_pct: u8,
    pub uptime_s: u32,
    pub error_code: u16,
}

impl HeartbeatPayload {
    pub const WIRE_SIZE: usize = 11;
}

/// Weapon engagement status (13 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngagementPayload {
    pub weapon_id: u16,
    pub mode: u8,
    pub assigned_track: u32,
    pub rounds_remaining: u16,
    pub barrel_temp_c: i16,
    pub burst_count: u16,
}

impl EngagementPayload {
    pub const WIRE_SIZE: usize = 13;
}

// --- Field-level helpers -------------------------------------------------

#[inline]
fn get_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

#[inline]
fn get_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[inline]
fn get_u64(buf: &[u8], at: usize) -> u64 {
    u64::from_le_bytes([
        buf[at],
        buf[at + 1],
        buf[at + 2],
        buf[at + 3],
        buf[at + 4],
        buf[at + 5],
        buf[at + 6],
        buf[at + 7],
    ])
}

#[inline]
fn get_i16(buf: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([buf[at], buf[at + 1]])
}

#[inline]
fn get_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

// --- Header --------------------------------------------------------------

/// Encode a header into its 18-byte wire form.
pub fn encode_header(h: &TelemetryHeader) -> [u8; TelemetryHeader::WIRE_SIZE] {
    let mut buf = [0u8; TelemetryHeader::WIRE_SIZE];
    buf[0] = h.version;
    buf[1] = h.msg_type;
    buf[2..4].copy_from_slice(&h.src_id.to_le_bytes());
    buf[4..8].copy_from_slice(&h.seq.to_le_bytes());
    buf[8..16].copy_from_slice(&h.ts_ns.to_le_bytes());
    buf[16..18].copy_from_slice(&h.payload_len.to_le_bytes());
    buf
}

/// Decode a header from the front of `buf`. Returns `None` if `buf` is
/// shorter than 18 bytes.
pub fn decode_header(buf: &[u8]) -> Option<TelemetryHeader> {
    if buf.len() < TelemetryHeader::WIRE_SIZE {
        return None;
    }
    Some(TelemetryHeader {
        version: buf[0],
        msg_type: buf[1],
        src_id: get_u16(buf, 2),
        seq: get_u32(buf, 4),
        ts_ns: get_u64(buf, 8),
        payload_len: get_u16(buf, 16),
    })
}

// --- Payloads ------------------------------------------------------------

pub fn encode_plot(p: &PlotPayload) -> [u8; PlotPayload::WIRE_SIZE] {
    let mut buf = [0u8; PlotPayload::WIRE_SIZE];
    buf[0..4].copy_from_slice(&p.plot_id.to_le_bytes());
    buf[4..8].copy_from_slice(&p.azimuth_mdeg.to_le_bytes());
    buf[8..12].copy_from_slice(&p.elevation_mdeg.to_le_bytes());
    buf[12..16].copy_from_slice(&p.range_m.to_le_bytes());
    buf[16..18].copy_from_slice(&p.amplitude_db.to_le_bytes());
    buf[18..20].copy_from_slice(&p.doppler_mps.to_le_bytes());
    buf[20] = p.quality;
    buf
}

pub fn decode_plot(buf: &[u8]) -> Option<PlotPayload> {
    if buf.len() < PlotPayload::WIRE_SIZE {
        return None;
    }
    Some(PlotPayload {
        plot_id: get_u32(buf, 0),
        azimuth_mdeg: get_i32(buf, 4),
        elevation_mdeg: get_i32(buf, 8),
        range_m: get_u32(buf, 12),
        amplitude_db: get_i16(buf, 16),
        doppler_mps: get_i16(buf, 18),
        quality: buf[20],
    })
}

pub fn encode_track(t: &TrackPayload) -> [u8; TrackPayload::WIRE_SIZE] {
    let mut buf = [0u8; TrackPayload::WIRE_SIZE];
    buf[0..4].copy_from_slice(&t.track_id.to_le_bytes());
    buf[4] = t.classification;
    buf[5] = t.threat_level;
    buf[6] = t.iff_status;
    buf[7..11].copy_from_slice(&t.azimuth_mdeg.to_le_bytes());
    buf[11..15].copy_from_slice(&t.elevation_mdeg.to_le_bytes());
    buf[15..19].copy_from_slice(&t.range_m.to_le_bytes());
    buf[19..21].copy_from_slice(&t.velocity_mps.to_le_bytes());
    buf[21..23].copy_from_slice(&t.rcs_dbsm.to_le_bytes());
    buf[23..25].copy_from_slice(&t.update_count.to_le_bytes());
    buf
}

pub fn decode_track(buf: &[u8]) -> Option<TrackPayload> {
    if buf.len() < TrackPayload::WIRE_SIZE {
        return None;
    }
    Some(TrackPayload {
        track_id: get_u32(buf, 0),
        classification: buf[4],
        threat_level: buf[5],
        iff_status: buf[6],
        azimuth_mdeg: get_i32(buf, 7),
        elevation_mdeg: get_i32(buf, 11),
        range_m: get_u32(buf, 15),
        velocity_mps: get_i16(buf, 19),
        rcs_dbsm: get_i16(buf, 21),
        update_count: get_u16(buf, 23),
    })
}

pub fn encode_heartbeat(hb: &HeartbeatPayload) -> [u8; HeartbeatPayload::WIRE_SIZE] {
    let mut buf = [0u8; HeartbeatPayload::WIRE_SIZE];
    buf[0..2].copy_from_slice(&hb.subsystem_id.to_le_bytes());
    buf[2] = hb.state;
    buf[3] = hb.cpu_pct;
    buf[4] = hb.mem_pct;
    buf[5..9].copy_from_slice(&hb.uptime_s.to_le_bytes());
    buf[9..11].copy_from_slice(&hb.error_code.to_le_bytes());
    buf
}

pub fn decode_heartbeat(buf: &[u8]) -> Option<HeartbeatPayload> {
    if buf.len() < HeartbeatPayload::WIRE_SIZE {
        return None;
    }
    Some(HeartbeatPayload {
        subsystem_id: get_u16(buf, 0),
        state: buf[2],
        cpu_pct: buf[3],
        mem_pct: buf[4],
        uptime_s: get_u32(buf, 5),
        error_code: get_u16(buf, 9),
    })
}

pub fn encode_engagement(e: &EngagementPayload) -> [u8; EngagementPayload::WIRE_SIZE] {
    let mut buf = [0u8; EngagementPayload::WIRE_SIZE];
    buf[0..2].copy_from_slice(&e.weapon_id.to_le_bytes());
    buf[2] = e.mode;
    buf[3..7].copy_from_slice(&e.assigned_track.to_le_bytes());
    buf[7..9].copy_from_slice(&e.rounds_remaining.to_le_bytes());
    buf[9..11].copy_from_slice(&e.barrel_temp_c.to_le_bytes());
    buf[11..13].copy_from_slice(&e.burst_count.to_le_bytes());
    buf
}

pub fn decode_engagement(buf: &[u8]) -> Option<EngagementPayload> {
    if buf.len() < EngagementPayload::WIRE_SIZE {
        return None;
    }
    Some(EngagementPayload {
        weapon_id: get_u16(buf, 0),
        mode: buf[2],
        assigned_track: get_u32(buf, 3),
        rounds_remaining: get_u16(buf, 7),
        barrel_temp_c: get_i16(buf, 9),
        burst_count: get_u16(buf, 11),
    })
}
