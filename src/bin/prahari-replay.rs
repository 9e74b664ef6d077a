//! Recording re-injection tool
//!
//! Streams a recorded session back over UDP at a chosen speed, or prints
//! per-frame summaries with `--dry-run`.

use prahari_gw::error::{Error, Result};
use prahari_gw::protocol::{decode_header, MsgType};
use prahari_gw::source::{ReplayFrameSource, UdpFrameSink};
use std::path::PathBuf;
use std::time::Instant;

fn print_usage() {
    eprintln!(
        "Usage: prahari-replay --file <path> [options]\n\
         Options:\n\
         \x20 --file <path>     Recorded file to replay (required)\n\
         \x20 --speed <mult>    Playback speed (1.0 = real-time, 0 = fast)\n\
         \x20 --host <ip>       Target host (default: 127.0.0.1)\n\
         \x20 --port <port>     Target UDP port (default: 5000)\n\
         \x20 --dry-run         Print frame summaries without sending\n\
         \x20 --help            Show this help"
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut file: Option<PathBuf> = None;
    let mut speed = 1.0f64;
    let mut host = "127.0.0.1".to_string();
    let mut port = 5000u16;
    let mut dry_run = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" => {
                file = Some(PathBuf::from(args.next().ok_or_else(|| {
                    Error::Config("--file requires a path".to_string())
                })?));
            }
            "--speed" => {
                let raw = args
                    .next()
                    .ok_or_else(|| Error::Config("--speed requires a value".to_string()))?;
                speed = raw
                    .parse()
                    .map_err(|_| Error::Config(format!("invalid speed '{}'", raw)))?;
            }
            "--host" => {
                host = args
                    .next()
                    .ok_or_else(|| Error::Config("--host requires a value".to_string()))?;
            }
            "--port" => {
                let raw = args
                    .next()
                    .ok_or_else(|| Error::Config("--port requires a value".to_string()))?;
                port = raw
                    .parse()
                    .map_err(|_| Error::Config(format!("invalid port '{}'", raw)))?;
            }
            "--dry-run" => dry_run = true,
            "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                return Err(Error::Config(format!("unknown option '{}'", other)));
            }
        }
    }

    let file = file.ok_or_else(|| {
        print_usage();
        Error::Config("--file is required".to_string())
    })?;

    let mut replay = ReplayFrameSource::open(&file)?;
    replay.set_speed(speed);

    let sink = if dry_run {
        None
    } else {
        Some(UdpFrameSink::connect(&host, port)?)
    };

    let start = Instant::now();
    let mut buf = Vec::new();

    while !replay.is_done() {
        if !replay.receive(&mut buf) {
            break;
        }

        match &sink {
            Some(sink) => {
                sink.send(&buf);
            }
            None => match decode_header(&buf) {
                Some(header) => {
                    let msg_type = match MsgType::from_wire(header.msg_type) {
                        Some(MsgType::Plot) => "PLOT",
                        Some(MsgType::Track) => "TRACK",
                        Some(MsgType::Heartbeat) => "HEARTBEAT",
                        Some(MsgType::Engagement) => "ENGAGEMENT",
                        None => "UNKNOWN",
                    };
                    println!(
                        "Frame {}: src_id={} seq={} type={} len={}",
                        replay.frames_replayed(),
                        header.src_id,
                        header.seq,
                        msg_type,
                        buf.len()
                    );
                }
                None => {
                    println!(
                        "Frame {}: len={} (too short for header)",
                        replay.frames_replayed(),
                        buf.len()
                    );
                }
            },
        }
    }

    let elapsed = start.elapsed();
    log::info!("=== Replay Summary ===");
    log::info!("Frames replayed: {}", replay.frames_replayed());
    log::info!("Duration: {} ms", elapsed.as_millis());
    if !elapsed.is_zero() && replay.frames_replayed() > 0 {
        log::info!(
            "Effective rate: {:.0} frames/sec",
            replay.frames_replayed() as f64 / elapsed.as_secs_f64()
        );
    }

    Ok(())
}
