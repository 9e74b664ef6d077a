//! Telemetry frame synthesis
//!
//! Turns world objects into wire frames the way a real sensor head would:
//! PLOTs are probabilistic raw detections with measurement noise, TRACKs are
//! associated detections with derived threat and IFF fields, plus periodic
//! HEARTBEATs and on-demand ENGAGEMENT status. Frames share one sequence
//! counter per generator, so the gateway sees a single coherent source.

use super::objects::WorldObject;
use crate::protocol::{
    crc32, encode_engagement, encode_header, encode_heartbeat, encode_plot, encode_track,
    EngagementPayload, HeartbeatPayload, IffStatus, MsgType, PlotPayload, TelemetryHeader,
    ThreatLevel, TrackClass, TrackPayload, WeaponMode, PROTOCOL_VERSION,
};
use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::Normal;
use std::collections::HashMap;

/// Builds telemetry frames for one simulated source
pub struct MeasurementGenerator {
    src_id: u16,
    seq: u32,
    rng: SmallRng,
    plot_id: u32,
    track_update_counts: HashMap<u32, u16>,
    /// Append the CRC-32 trailer so frames pass a CRC-validating gateway.
    with_crc: bool,
}

impl MeasurementGenerator {
    pub fn new(src_id: u16, seed: u64) -> Self {
        MeasurementGenerator {
            src_id,
            seq: 0,
            rng: SmallRng::seed_from_u64(seed),
            plot_id: 1,
            track_update_counts: HashMap::new(),
            with_crc: false,
        }
    }

    /// Emit frames with the CRC-32 trailer appended.
    pub fn set_crc(&mut self, enabled: bool) {
        self.with_crc = enabled;
    }

    /// Next sequence number to be assigned.
    pub fn seq(&self) -> u32 {
        self.seq
    }

    fn build_frame(&mut self, msg_type: MsgType, payload: &[u8], timestamp_ns: u64) -> Vec<u8> {
        let header = TelemetryHeader {
            version: PROTOCOL_VERSION,
            msg_type: msg_type as u8,
            src_id: self.src_id,
            seq: self.seq,
            ts_ns: timestamp_ns,
            payload_len: payload.len() as u16,
        };
        self.seq = self.seq.wrapping_add(1);

        let mut frame = encode_header(&header).to_vec();
        frame.extend_from_slice(payload);
        if self.with_crc {
            let crc = crc32(&frame);
            frame.extend_from_slice(&crc.to_le_bytes());
        }
        frame
    }

    fn gaussian(&mut self, stddev: f64) -> f64 {
        if stddev <= 0.0 {
            return 0.0;
        }
        Normal::new(0.0, stddev)
            .map(|n| n.sample(&mut self.rng))
            .unwrap_or(0.0)
    }

    /// Raw detections. Each object is detected with probability
    /// `clamp(rcs_linear / range_km², 0.1, 1.0)`, then measured with noise.
    pub fn generate_plots(
        &mut self,
        objects: &[WorldObject],
        timestamp_ns: u64,
    ) -> Vec<Vec<u8>> {
        let mut frames = Vec::with_capacity(objects.len());

        for obj in objects {
            let rcs_linear = 10f64.powf(obj.rcs_dbsm / 10.0);
            let range_km = obj.range_m / 1000.0;
            let p_detect = (rcs_linear / (range_km * range_km)).clamp(0.1, 1.0);

            if self.rng.gen_range(0.0..1.0) > p_detect {
                continue;
            }

            let noise = obj.noise_stddev;
            let plot = PlotPayload {
                plot_id: self.plot_id,
                azimuth_mdeg: ((obj.azimuth_deg + self.gaussian(noise) * 0.01) * 1000.0) as i32,
                elevation_mdeg: ((obj.elevation_deg + self.gaussian(noise) * 0.01) * 1000.0)
                    as i32,
                range_m: (obj.range_m + self.gaussian(noise)).max(0.0) as u32,
                amplitude_db: (obj.rcs_dbsm * 10.0 + self.gaussian(noise) * 5.0) as i16,
                doppler_mps: (-obj.speed_mps * obj.heading_deg.to_radians().cos()) as i16,
                quality: ((p_detect * 100.0) as i64).clamp(10, 100) as u8,
            };
            self.plot_id = self.plot_id.wrapping_add(1);

            let payload = encode_plot(&plot);
            frames.push(self.build_frame(MsgType::Plot, &payload, timestamp_ns));
        }
        frames
    }

    /// Associated tracks with threat level derived from hostility and class.
    pub fn generate_tracks(
        &mut self,
        objects: &[WorldObject],
        timestamp_ns: u64,
    ) -> Vec<Vec<u8>> {
        let mut frames = Vec::with_capacity(objects.len());

        for obj in objects {
            let threat = if !obj.is_hostile {
                ThreatLevel::Low
            } else {
                match obj.classification {
                    TrackClass::Missile | TrackClass::RocketArtillery => ThreatLevel::Critical,
                    TrackClass::UavSmall | TrackClass::UavLarge => ThreatLevel::High,
                    _ => ThreatLevel::Medium,
                }
            };

            let iff = if obj.is_hostile {
                IffStatus::Foe
            } else {
                IffStatus::Friend
            };

            let update_count = self.track_update_counts.entry(obj.id).or_insert(0);
            *update_count = update_count.wrapping_add(1);
            let update_count = *update_count;

            let noise = obj.noise_stddev;
            let track = TrackPayload {
                track_id: obj.id,
                classification: obj.classification as u8,
                threat_level: threat as u8,
                iff_status: iff as u8,
                azimuth_mdeg: (obj.azimuth_deg * 1000.0 + self.gaussian(1.0) * noise * 10.0)
                    as i32,
                elevation_mdeg: (obj.elevation_deg * 1000.0 + self.gaussian(1.0) * noise * 10.0)
                    as i32,
                range_m: (obj.range_m + self.gaussian(1.0) * noise).max(0.0) as u32,
                velocity_mps: (-obj.speed_mps * obj.heading_deg.to_radians().cos()) as i16,
                rcs_dbsm: (obj.rcs_dbsm * 100.0) as i16,
                update_count,
            };

            let payload = encode_track(&track);
            frames.push(self.build_frame(MsgType::Track, &payload, timestamp_ns));
        }
        frames
    }

    /// Periodic health report for this source.
    pub fn generate_heartbeat(&mut self, timestamp_ns: u64) -> Vec<u8> {
        let hb = HeartbeatPayload {
            subsystem_id: self.src_id,
            state: 0,
            cpu_pct: self.rng.gen_range(10..=60),
            mem_pct: self.rng.gen_range(20..=70),
            uptime_s: (timestamp_ns / 1_000_000_000) as u32,
            error_code: 0,
        };
        let payload = encode_heartbeat(&hb);
        self.build_frame(MsgType::Heartbeat, &payload, timestamp_ns)
    }

    /// Weapon engagement status frame.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_engagement(
        &mut self,
        weapon_id: u16,
        mode: WeaponMode,
        assigned_track: u32,
        rounds: u16,
        barrel_temp_c: i16,
        bursts: u16,
        timestamp_ns: u64,
    ) -> Vec<u8> {
        let eng = EngagementPayload {
            weapon_id,
            mode: mode as u8,
            assigned_track,
            rounds_remaining: rounds,
            barrel_temp_c,
            burst_count: bursts,
        };
        let payload = encode_engagement(&eng);
        self.build_frame(MsgType::Engagement, &payload, timestamp_ns)
    }
}
