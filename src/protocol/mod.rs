//! Telemetry protocol definitions
//!
//! Message types, domain enumerations, the event catalog, and the wire-format
//! constants shared by the gateway, the simulator, and the tools.

pub mod crc;
pub mod wire;

pub use crc::{crc32, crc32_update};
pub use wire::{
    decode_engagement, decode_header, decode_heartbeat, decode_plot, decode_track,
    encode_engagement, encode_header, encode_heartbeat, encode_plot, encode_track,
    EngagementPayload, HeartbeatPayload, PlotPayload, TelemetryHeader, TrackPayload,
};

/// Protocol version carried in every frame header
pub const PROTOCOL_VERSION: u8 = 1;

/// Frame header size: version(1) + msg_type(1) + src_id(2) + seq(4) + ts_ns(8) + payload_len(2)
pub const FRAME_HEADER_SIZE: usize = 18;
/// CRC-32 trailer size
pub const FRAME_CRC_SIZE: usize = 4;
/// Upper bound on the declared payload length
pub const MAX_PAYLOAD_SIZE: usize = 1024;

/// Telemetry message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    Plot = 0x01,
    Track = 0x02,
    Heartbeat = 0x03,
    Engagement = 0x04,
}

impl MsgType {
    /// Map a wire byte to a message type
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(MsgType::Plot),
            0x02 => Some(MsgType::Track),
            0x03 => Some(MsgType::Heartbeat),
            0x04 => Some(MsgType::Engagement),
            _ => None,
        }
    }
}

/// Track classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TrackClass {
    Unknown = 0x00,
    FixedWing = 0x01,
    RotaryWing = 0x02,
    UavSmall = 0x03,
    UavLarge = 0x04,
    Missile = 0x05,
    RocketArtillery = 0x06,
    Bird = 0x07,
    Decoy = 0x08,
}

impl TrackClass {
    /// Parse the scenario-file spelling of a class
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "UNKNOWN" => Some(TrackClass::Unknown),
            "FIXED_WING" => Some(TrackClass::FixedWing),
            "ROTARY_WING" => Some(TrackClass::RotaryWing),
            "UAV_SMALL" => Some(TrackClass::UavSmall),
            "UAV_LARGE" => Some(TrackClass::UavLarge),
            "MISSILE" => Some(TrackClass::Missile),
            "ROCKET_ARTILLERY" => Some(TrackClass::RocketArtillery),
            "BIRD" => Some(TrackClass::Bird),
            "DECOY" => Some(TrackClass::Decoy),
            _ => None,
        }
    }
}

/// Threat level assigned to a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreatLevel {
    Unknown = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

/// IFF interrogation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IffStatus {
    NoResponse = 0,
    Friend = 1,
    Foe = 2,
    Pending = 3,
}

/// Subsystem state reported in heartbeats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SubsystemState {
    Ok = 0,
    Degraded = 1,
    Error = 2,
    Offline = 3,
}

impl SubsystemState {
    pub fn from_wire(byte: u8) -> Self {
        match byte {
            0 => SubsystemState::Ok,
            1 => SubsystemState::Degraded,
            2 => SubsystemState::Error,
            _ => SubsystemState::Offline,
        }
    }
}

/// Weapon mode reported in engagement status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WeaponMode {
    Safe = 0,
    Armed = 1,
    Engaging = 2,
    CeaseFire = 3,
}

/// Journal severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Alarm = 3,
    Error = 4,
    Fatal = 5,
}

impl Severity {
    /// Bracket form, padded to 5 characters
    pub fn padded(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO ",
            Severity::Warn => "WARN ",
            Severity::Alarm => "ALARM",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parse the operator spelling (`DEBUG`, `INFO`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DEBUG" => Some(Severity::Debug),
            "INFO" => Some(Severity::Info),
            "WARN" => Some(Severity::Warn),
            "ALARM" => Some(Severity::Alarm),
            "ERROR" => Some(Severity::Error),
            "FATAL" => Some(Severity::Fatal),
            _ => None,
        }
    }
}

/// Event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventCategory {
    Tracking = 0,
    Threat = 1,
    Iff = 2,
    Engagement = 3,
    Network = 4,
    Health = 5,
    Control = 6,
}

impl EventCategory {
    /// Bracket form, left-justified to 10 characters
    pub fn padded(self) -> &'static str {
        match self {
            EventCategory::Tracking => "TRACKING  ",
            EventCategory::Threat => "THREAT    ",
            EventCategory::Iff => "IFF       ",
            EventCategory::Engagement => "ENGAGEMENT",
            EventCategory::Network => "NETWORK   ",
            EventCategory::Health => "HEALTH    ",
            EventCategory::Control => "CONTROL   ",
        }
    }
}

/// Event catalog
///
/// The full set of events any component may publish. The discriminants group
/// by category: 0x01xx tracking, 0x02xx threat, 0x03xx IFF, 0x04xx
/// engagement, 0x05xx network, 0x06xx health, 0x07xx control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum EventId {
    EvtTrackNew = 0x0100,
    EvtTrackUpdate = 0x0101,
    EvtTrackLost = 0x0102,
    EvtTrackClassify = 0x0103,
    EvtThreatEval = 0x0200,
    EvtThreatCritical = 0x0201,
    EvtIffResponse = 0x0300,
    EvtIffFoe = 0x0301,
    EvtEngageStart = 0x0400,
    EvtEngageCease = 0x0401,
    EvtWeaponStatus = 0x0402,
    EvtAmmoLow = 0x0403,
    EvtSeqGap = 0x0500,
    EvtSeqReorder = 0x0501,
    EvtFrameMalformed = 0x0502,
    EvtCrcFail = 0x0503,
    EvtSourceOnline = 0x0504,
    EvtSourceTimeout = 0x0505,
    EvtHeartbeatOk = 0x0600,
    EvtHeartbeatDegrade = 0x0601,
    EvtHeartbeatError = 0x0602,
    EvtConfigChange = 0x0700,
}

impl EventId {
    /// Canonical event name as it appears in the journal
    pub fn name(self) -> &'static str {
        match self {
            EventId::EvtTrackNew => "EVT_TRACK_NEW",
            EventId::EvtTrackUpdate => "EVT_TRACK_UPDATE",
            EventId::EvtTrackLost => "EVT_TRACK_LOST",
            EventId::EvtTrackClassify => "EVT_TRACK_CLASSIFY",
            EventId::EvtThreatEval => "EVT_THREAT_EVAL",
            EventId::EvtThreatCritical => "EVT_THREAT_CRITICAL",
            EventId::EvtIffResponse => "EVT_IFF_RESPONSE",
            EventId::EvtIffFoe => "EVT_IFF_FOE",
            EventId::EvtEngageStart => "EVT_ENGAGE_START",
            EventId::EvtEngageCease => "EVT_ENGAGE_CEASE",
            EventId::EvtWeaponStatus => "EVT_WEAPON_STATUS",
            EventId::EvtAmmoLow => "EVT_AMMO_LOW",
            EventId::EvtSeqGap => "EVT_SEQ_GAP",
            EventId::EvtSeqReorder => "EVT_SEQ_REORDER",
            EventId::EvtFrameMalformed => "EVT_FRAME_MALFORMED",
            EventId::EvtCrcFail => "EVT_CRC_FAIL",
            EventId::EvtSourceOnline => "EVT_SOURCE_ONLINE",
            EventId::EvtSourceTimeout => "EVT_SOURCE_TIMEOUT",
            EventId::EvtHeartbeatOk => "EVT_HEARTBEAT_OK",
            EventId::EvtHeartbeatDegrade => "EVT_HEARTBEAT_DEGRADE",
            EventId::EvtHeartbeatError => "EVT_HEARTBEAT_ERROR",
            EventId::EvtConfigChange => "EVT_CONFIG_CHANGE",
        }
    }
}
