//! Prahari gateway daemon
//!
//! Binds the UDP ingest loop and the TCP control channel together. Frames
//! can come from the network or, with `--replay`, from a recording.

use prahari_gw::control::ControlServer;
use prahari_gw::error::{Error, Result};
use prahari_gw::protocol::Severity;
use prahari_gw::{Config, EventJournal, Gateway};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn print_usage() {
    eprintln!(
        "Usage: prahari-gw [options]\n\
         Options:\n\
         \x20 --config <path>     TOML config file (default: ./prahari.toml if present)\n\
         \x20 --port <port>       UDP port to listen on\n\
         \x20 --no-crc            Disable CRC validation\n\
         \x20 --record <path>     Record frames to file\n\
         \x20 --replay <path>     Replay frames from file instead of UDP\n\
         \x20 --log-level <level> DEBUG, INFO, WARN, ALARM, ERROR, FATAL\n\
         \x20 --help              Show this help"
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config_path: Option<PathBuf> = None;
    let mut port_override: Option<u16> = None;
    let mut no_crc = false;
    let mut record_path: Option<PathBuf> = None;
    let mut replay_path: Option<PathBuf> = None;
    let mut log_level: Option<Severity> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(args.next().ok_or_else(|| {
                    Error::Config("--config requires a path".to_string())
                })?));
            }
            "--port" => {
                let value = args
                    .next()
                    .ok_or_else(|| Error::Config("--port requires a value".to_string()))?;
                port_override = Some(value.parse().map_err(|_| {
                    Error::Config(format!("invalid port '{}'", value))
                })?);
            }
            "--no-crc" => no_crc = true,
            "--record" => {
                record_path = Some(PathBuf::from(args.next().ok_or_else(|| {
                    Error::Config("--record requires a path".to_string())
                })?));
            }
            "--replay" => {
                replay_path = Some(PathBuf::from(args.next().ok_or_else(|| {
                    Error::Config("--replay requires a path".to_string())
                })?));
            }
            "--log-level" => {
                let value = args
                    .next()
                    .ok_or_else(|| Error::Config("--log-level requires a value".to_string()))?;
                log_level = Some(
                    Severity::from_name(&value.to_ascii_uppercase()).ok_or_else(|| {
                        Error::Config(format!("invalid log level '{}'", value))
                    })?,
                );
            }
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

    // Load config file: explicit path, or ./prahari.toml when present.
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => {
            let default_path = PathBuf::from("./prahari.toml");
            if default_path.exists() {
                Config::load(default_path)?
            } else {
                Config::default()
            }
        }
    };

    let mut gateway_config = config.gateway_config();
    if let Some(port) = port_override {
        gateway_config.udp_port = port;
    }
    if no_crc {
        gateway_config.crc_enabled = false;
    }
    if let Some(path) = record_path {
        gateway_config.record_enabled = true;
        gateway_config.record_path = path;
    }
    gateway_config.replay_path = replay_path;
    if let Some(level) = log_level {
        gateway_config.log_level = level;
    }

    log::info!("Prahari gateway v{} starting...", env!("CARGO_PKG_VERSION"));
    match &gateway_config.replay_path {
        Some(path) => log::info!("Replaying from: {}", path.display()),
        None => log::info!("Listening on UDP port {}", gateway_config.udp_port),
    }
    if gateway_config.record_enabled {
        log::info!("Recording to: {}", gateway_config.record_path.display());
    }
    log::info!(
        "CRC validation: {}",
        if gateway_config.crc_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    let journal = Arc::new(EventJournal::new());
    let mut gateway = Gateway::new(gateway_config, Arc::clone(&journal));

    let mut control = ControlServer::new(gateway.stats(), journal, gateway.crc_flag());
    control.start(config.control.port)?;

    // SIGINT/SIGTERM flip the same flag the ingest loop polls.
    let shutdown = gateway.shutdown_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        shutdown.store(true, Ordering::SeqCst);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    log::info!("Control channel on TCP port {}", control.port());
    log::info!("Press Ctrl-C to stop.");

    let run_result = gateway.run();

    control.stop();

    let stats = gateway.stats().global_snapshot();
    log::info!("=== Final Statistics ===");
    log::info!("Frames received: {}", stats.rx_total);
    log::info!("Malformed:       {}", stats.malformed_total);
    log::info!("CRC failures:    {}", stats.crc_fail_total);
    log::info!("Sequence gaps:   {}", stats.gap_total);
    log::info!("Reorders:        {}", stats.reorder_total);
    log::info!("Duplicates:      {}", stats.duplicate_total);

    run_result
}
