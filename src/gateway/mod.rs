//! Gateway orchestration
//!
//! The ingest loop: receive a frame from the source (live UDP or replay),
//! timestamp it, optionally record the raw bytes, parse, classify the
//! sequence number, update counters, and publish events. Recording happens
//! before any content-dependent filtering so a replay sees exactly the
//! observed byte stream.

mod parser;
mod recorder;
mod stats;
mod tracker;

pub use parser::{parse_frame, ParseError, ParsedFrame};
pub use recorder::FrameRecorder;
pub use stats::{GlobalStats, HealthState, SourceStats, StatsAggregator};
pub use tracker::{SeqEvent, SeqVerdict, SequenceTracker};

use crate::error::Result;
use crate::events::{EventBus, EventRecord};
use crate::journal::EventJournal;
use crate::protocol::{
    decode_engagement, decode_heartbeat, decode_plot, decode_track, EngagementPayload,
    EventCategory, EventId, HeartbeatPayload, MsgType, PlotPayload, Severity, SubsystemState,
    TrackPayload,
};
use crate::source::{FrameSource, ReplayFrameSource, UdpFrameSource};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Runtime configuration of one gateway instance
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// UDP ingest port (ignored in replay mode)
    pub udp_port: u16,
    pub crc_enabled: bool,
    pub record_enabled: bool,
    pub record_path: PathBuf,
    /// When set, frames come from this recording instead of the network
    pub replay_path: Option<PathBuf>,
    pub log_level: Severity,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            udp_port: 5000,
            crc_enabled: true,
            record_enabled: false,
            record_path: PathBuf::from("./recorded/session.bin"),
            replay_path: None,
            log_level: Severity::Info,
        }
    }
}

/// Binds a frame source to the parse/classify/count/publish pipeline
pub struct Gateway {
    config: GatewayConfig,
    stats: Arc<StatsAggregator>,
    events: Arc<EventBus>,
    journal: Arc<EventJournal>,
    tracker: SequenceTracker,
    recorder: FrameRecorder,
    /// Live CRC switch; the control channel flips it mid-run.
    crc_enabled: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    epoch: Instant,
}

impl Gateway {
    pub fn new(config: GatewayConfig, journal: Arc<EventJournal>) -> Self {
        journal.set_level(config.log_level);
        let crc_enabled = Arc::new(AtomicBool::new(config.crc_enabled));
        Gateway {
            config,
            stats: Arc::new(StatsAggregator::new()),
            events: Arc::new(EventBus::new()),
            journal,
            tracker: SequenceTracker::new(),
            recorder: FrameRecorder::new(),
            crc_enabled,
            shutdown: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            epoch: Instant::now(),
        }
    }

    pub fn stats(&self) -> Arc<StatsAggregator> {
        Arc::clone(&self.stats)
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    pub fn journal(&self) -> Arc<EventJournal> {
        Arc::clone(&self.journal)
    }

    /// The published CRC flag, shared with the control handler.
    pub fn crc_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.crc_enabled)
    }

    /// Flag observed by the ingest loop; share it with whoever must stop the
    /// gateway from another thread.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Flag that is true while the ingest loop runs; lets another thread
    /// wait for startup after handing the gateway off to `run()`.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Request the ingest loop to exit; it observes the flag within one
    /// receive timeout (~100 ms).
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Run the ingest loop until stopped or (in replay mode) the stream is
    /// exhausted. Bind/open failures of the frame source are fatal.
    pub fn run(&mut self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let mut source = match &self.config.replay_path {
            Some(path) => {
                let mut replay = match ReplayFrameSource::open(path) {
                    Ok(r) => r,
                    Err(e) => {
                        self.journal.log(
                            Severity::Error,
                            EventCategory::Network,
                            EventId::EvtSourceTimeout.name(),
                            &format!("Failed to open replay file {}: {}", path.display(), e),
                        );
                        return Err(e);
                    }
                };
                // Replay ingests at full speed; pacing is for re-injection.
                replay.set_speed(0.0);
                FrameSource::Replay(replay)
            }
            None => {
                let udp = match UdpFrameSource::bind(self.config.udp_port) {
                    Ok(s) => s,
                    Err(e) => {
                        self.journal.log(
                            Severity::Error,
                            EventCategory::Network,
                            EventId::EvtSourceTimeout.name(),
                            &format!("Failed to bind UDP port {}: {}", self.config.udp_port, e),
                        );
                        return Err(e);
                    }
                };
                FrameSource::Udp(udp)
            }
        };

        if self.config.record_enabled {
            if let Err(e) = self.recorder.open(&self.config.record_path) {
                self.journal.log(
                    Severity::Warn,
                    EventCategory::Network,
                    EventId::EvtConfigChange.name(),
                    &format!(
                        "Failed to open record file {}: {}",
                        self.config.record_path.display(),
                        e
                    ),
                );
            }
        }

        self.running.store(true, Ordering::SeqCst);
        self.shutdown.store(false, Ordering::SeqCst);

        self.journal.log(
            Severity::Info,
            EventCategory::Control,
            EventId::EvtConfigChange.name(),
            &format!("Gateway started on port {}", self.config.udp_port),
        );

        let mut buf = Vec::with_capacity(2048);
        while !self.shutdown.load(Ordering::Relaxed) {
            if !source.receive(&mut buf) {
                if source.is_done() {
                    break;
                }
                continue;
            }

            let rx_ts_ns = self.epoch.elapsed().as_nanos() as u64;
            self.process_frame(&buf, rx_ts_ns);
        }

        self.recorder.close();
        self.running.store(false, Ordering::SeqCst);

        self.journal.log(
            Severity::Info,
            EventCategory::Control,
            EventId::EvtConfigChange.name(),
            "Gateway stopped",
        );
        Ok(())
    }

    fn process_frame(&mut self, frame: &[u8], rx_ts_ns: u64) {
        // Record first: replay must see the stream exactly as observed,
        // malformed bytes included.
        if self.recorder.is_open() {
            if let Err(e) = self.recorder.record(rx_ts_ns, frame) {
                log::warn!("Recording failed, disabling recorder: {}", e);
                self.recorder.close();
            }
        }

        let crc_enabled = self.crc_enabled.load(Ordering::Relaxed);
        let parsed = match parse_frame(frame, crc_enabled) {
            Ok(parsed) => parsed,
            Err(ParseError::CrcMismatch) => {
                self.stats.record_crc_fail(0);
                self.publish(
                    EventId::EvtCrcFail,
                    EventCategory::Network,
                    Severity::Warn,
                    format!("error={}", ParseError::CrcMismatch.code()),
                );
                return;
            }
            Err(e) => {
                self.stats.record_malformed(0);
                self.publish(
                    EventId::EvtFrameMalformed,
                    EventCategory::Network,
                    Severity::Warn,
                    format!("error={} len={}", e.code(), frame.len()),
                );
                return;
            }
        };

        let header = parsed.header;
        let seq_event = self.tracker.classify(header.src_id, header.seq);
        self.stats.record_rx(header.src_id, header.seq, rx_ts_ns);

        match seq_event.verdict {
            SeqVerdict::First => {
                self.publish(
                    EventId::EvtSourceOnline,
                    EventCategory::Network,
                    Severity::Info,
                    format!("src_id={}", header.src_id),
                );
            }
            SeqVerdict::Gap => {
                self.stats.record_gap(header.src_id, seq_event.gap_size);
                self.publish(
                    EventId::EvtSeqGap,
                    EventCategory::Network,
                    Severity::Warn,
                    format!(
                        "src_id={} expected={} actual={} gap={}",
                        header.src_id,
                        seq_event.expected_seq,
                        seq_event.actual_seq,
                        seq_event.gap_size
                    ),
                );
            }
            SeqVerdict::Reorder => {
                self.stats.record_reorder(header.src_id);
                self.publish(
                    EventId::EvtSeqReorder,
                    EventCategory::Network,
                    Severity::Warn,
                    format!(
                        "src_id={} expected={} actual={}",
                        header.src_id, seq_event.expected_seq, seq_event.actual_seq
                    ),
                );
            }
            SeqVerdict::Duplicate => {
                self.stats.record_duplicate(header.src_id);
            }
            SeqVerdict::Ok => {}
        }

        match MsgType::from_wire(header.msg_type) {
            Some(MsgType::Plot) => {
                if let Some(plot) = decode_plot(parsed.payload) {
                    self.publish_plot(header.src_id, &plot);
                }
            }
            Some(MsgType::Track) => {
                if let Some(track) = decode_track(parsed.payload) {
                    self.publish_track(header.src_id, &track);
                }
            }
            Some(MsgType::Heartbeat) => {
                if let Some(hb) = decode_heartbeat(parsed.payload) {
                    self.publish_heartbeat(&hb);
                }
            }
            Some(MsgType::Engagement) => {
                if let Some(eng) = decode_engagement(parsed.payload) {
                    self.publish_engagement(&eng);
                }
            }
            // Unreachable past the parser, but the dispatch stays total.
            None => {}
        }
    }

    fn publish_plot(&self, src_id: u16, plot: &PlotPayload) {
        self.publish(
            EventId::EvtTrackNew,
            EventCategory::Tracking,
            Severity::Debug,
            format!(
                "src_id={} plot_id={} range={}m",
                src_id, plot.plot_id, plot.range_m
            ),
        );
    }

    fn publish_track(&self, src_id: u16, track: &TrackPayload) {
        self.publish(
            EventId::EvtTrackUpdate,
            EventCategory::Tracking,
            Severity::Debug,
            format!(
                "src_id={} track_id={} class={} threat={}",
                src_id, track.track_id, track.classification, track.threat_level
            ),
        );
    }

    fn publish_heartbeat(&self, hb: &HeartbeatPayload) {
        let (id, sev) = match SubsystemState::from_wire(hb.state) {
            SubsystemState::Ok => (EventId::EvtHeartbeatOk, Severity::Debug),
            SubsystemState::Degraded => (EventId::EvtHeartbeatDegrade, Severity::Warn),
            SubsystemState::Error | SubsystemState::Offline => {
                (EventId::EvtHeartbeatError, Severity::Alarm)
            }
        };
        self.publish(
            id,
            EventCategory::Health,
            sev,
            format!(
                "subsystem={} state={} cpu={}% mem={}%",
                hb.subsystem_id, hb.state, hb.cpu_pct, hb.mem_pct
            ),
        );
    }

    fn publish_engagement(&self, eng: &EngagementPayload) {
        self.publish(
            EventId::EvtWeaponStatus,
            EventCategory::Engagement,
            Severity::Info,
            format!(
                "weapon={} mode={} track={} rounds={}",
                eng.weapon_id, eng.mode, eng.assigned_track, eng.rounds_remaining
            ),
        );
    }

    fn publish(&self, id: EventId, category: EventCategory, severity: Severity, detail: String) {
        self.journal.log(severity, category, id.name(), &detail);
        self.events.publish(&EventRecord {
            id,
            category,
            severity,
            timestamp_ns: self.epoch.elapsed().as_nanos() as u64,
            detail,
        });
    }
}
