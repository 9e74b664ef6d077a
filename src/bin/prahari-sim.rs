//! Sensor simulator
//!
//! Drives a scenario against a running gateway: ticks the world model at a
//! fixed rate, synthesizes PLOT/TRACK/HEARTBEAT frames, pushes them through
//! the fault injector, and sends them over UDP.

use prahari_gw::error::{Error, Result};
use prahari_gw::sim::{
    FaultConfig, FaultInjector, MeasurementGenerator, ObjectGenerator, ScenarioProfile,
    WorldModel,
};
use prahari_gw::source::UdpFrameSink;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn print_usage() {
    eprintln!(
        "Usage: prahari-sim [options]\n\
         Options:\n\
         \x20 --profile <name>    Scenario profile: idle, patrol, raid, stress (default: patrol)\n\
         \x20 --profile-file <f>  Load profile from JSON file\n\
         \x20 --host <ip>         Target host (default: 127.0.0.1)\n\
         \x20 --port <port>       Target UDP port (default: 5000)\n\
         \x20 --src-id <id>       Source ID for emitted frames (default: 1)\n\
         \x20 --rate <hz>         Tick rate in Hz (default: 50)\n\
         \x20 --duration <sec>    Duration in seconds (default: 10)\n\
         \x20 --seed <int>        Random seed (default: 42)\n\
         \x20 --crc               Append CRC-32 trailers to frames\n\
         \x20 --loss <pct>        Packet loss percentage (default: 0)\n\
         \x20 --reorder <pct>     Reorder percentage (default: 0)\n\
         \x20 --duplicate <pct>   Duplicate percentage (default: 0)\n\
         \x20 --corrupt <pct>     Corruption percentage (default: 0)\n\
         \x20 --help              Show this help"
    );
}

struct SimArgs {
    profile_name: String,
    profile_file: Option<PathBuf>,
    host: String,
    port: u16,
    src_id: u16,
    rate_hz: f64,
    duration_s: f64,
    seed: u64,
    crc: bool,
    faults: FaultConfig,
}

impl Default for SimArgs {
    fn default() -> Self {
        SimArgs {
            profile_name: "patrol".to_string(),
            profile_file: None,
            host: "127.0.0.1".to_string(),
            port: 5000,
            src_id: 1,
            rate_hz: 50.0,
            duration_s: 10.0,
            seed: 42,
            crc: false,
            faults: FaultConfig::default(),
        }
    }
}

fn parse_args() -> Result<Option<SimArgs>> {
    let mut parsed = SimArgs::default();
    let mut args = std::env::args().skip(1);

    fn value<T: std::str::FromStr>(
        flag: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<T> {
        let raw = args
            .next()
            .ok_or_else(|| Error::Config(format!("{} requires a value", flag)))?;
        raw.parse()
            .map_err(|_| Error::Config(format!("invalid value for {}: '{}'", flag, raw)))
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--profile" => parsed.profile_name = value("--profile", &mut args)?,
            "--profile-file" => {
                parsed.profile_file = Some(PathBuf::from(
                    args.next()
                        .ok_or_else(|| Error::Config("--profile-file requires a path".into()))?,
                ))
            }
            "--host" => parsed.host = value("--host", &mut args)?,
            "--port" => parsed.port = value("--port", &mut args)?,
            "--src-id" => parsed.src_id = value("--src-id", &mut args)?,
            "--rate" => parsed.rate_hz = value("--rate", &mut args)?,
            "--duration" => parsed.duration_s = value("--duration", &mut args)?,
            "--seed" => parsed.seed = value("--seed", &mut args)?,
            "--crc" => parsed.crc = true,
            "--loss" => parsed.faults.loss_pct = value("--loss", &mut args)?,
            "--reorder" => parsed.faults.reorder_pct = value("--reorder", &mut args)?,
            "--duplicate" => parsed.faults.duplicate_pct = value("--duplicate", &mut args)?,
            "--corrupt" => parsed.faults.corrupt_pct = value("--corrupt", &mut args)?,
            "--help" => {
                print_usage();
                return Ok(None);
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                return Err(Error::Config(format!("unknown option '{}'", other)));
            }
        }
    }
    Ok(Some(parsed))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args()? {
        Some(args) => args,
        None => return Ok(()),
    };

    let profile = match &args.profile_file {
        Some(path) => prahari_gw::sim::load_scenario(path)?,
        None => ScenarioProfile::builtin(&args.profile_name).ok_or_else(|| {
            Error::Config(format!("unknown profile '{}'", args.profile_name))
        })?,
    };

    log::info!("=== Sensor Simulator ===");
    log::info!("Profile:  {}", profile.name);
    log::info!("Target:   {}:{}", args.host, args.port);
    log::info!("Rate:     {} Hz", args.rate_hz);
    log::info!("Duration: {} s", args.duration_s);
    log::info!("Seed:     {}", args.seed);
    log::info!(
        "Faults:   loss={}% reorder={}% dup={}% corrupt={}%",
        args.faults.loss_pct,
        args.faults.reorder_pct,
        args.faults.duplicate_pct,
        args.faults.corrupt_pct
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut generator = ObjectGenerator::new(profile, args.seed);
    let mut world = WorldModel::new();
    let mut measurer = MeasurementGenerator::new(args.src_id, args.seed + 100);
    measurer.set_crc(args.crc);
    let mut injector = FaultInjector::new(args.faults, args.seed + 200);

    let sink = UdpFrameSink::connect(&args.host, args.port)?;

    for obj in generator.generate_initial() {
        world.add_object(obj);
    }
    log::info!("Initial objects: {}", world.active_count());

    let dt = 1.0 / args.rate_hz;
    let total_ticks = (args.duration_s * args.rate_hz) as u64;
    let tick_period = Duration::from_secs_f64(dt);

    let mut frames_sent = 0u64;
    let mut fault_totals = [0u64; 4]; // dropped, reordered, duplicated, corrupted

    let start = Instant::now();
    let mut next_tick = start;

    let mut tick = 0u64;
    while tick < total_ticks && !shutdown.load(Ordering::Relaxed) {
        let current_time_s = tick as f64 * dt;
        let timestamp_ns = (current_time_s * 1e9) as u64;

        if let Some(obj) = generator.maybe_spawn(current_time_s) {
            world.add_object(obj);
        }
        world.tick(dt, current_time_s);

        let mut frames = measurer.generate_tracks(world.objects(), timestamp_ns);
        frames.extend(measurer.generate_plots(world.objects(), timestamp_ns));

        // Heartbeat once per 50 ticks.
        if tick % 50 == 0 {
            frames.push(measurer.generate_heartbeat(timestamp_ns));
        }

        injector.apply(&mut frames);
        let stats = injector.last_stats();
        fault_totals[0] += stats.dropped as u64;
        fault_totals[1] += stats.reordered as u64;
        fault_totals[2] += stats.duplicated as u64;
        fault_totals[3] += stats.corrupted as u64;

        for frame in &frames {
            if sink.send(frame) {
                frames_sent += 1;
            }
        }

        tick += 1;
        next_tick += tick_period;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        }

        if tick % (args.rate_hz.max(1.0) as u64) == 0 {
            log::info!(
                "Progress: {}/{} ticks, {} frames sent, {} objects",
                tick,
                total_ticks,
                frames_sent,
                world.active_count()
            );
        }
    }

    let elapsed = start.elapsed();
    log::info!("=== Summary ===");
    log::info!("Ticks:            {}", tick);
    log::info!("Frames sent:      {}", frames_sent);
    log::info!("Frames dropped:   {}", fault_totals[0]);
    log::info!("Frames reordered: {}", fault_totals[1]);
    log::info!("Frames duped:     {}", fault_totals[2]);
    log::info!("Frames corrupted: {}", fault_totals[3]);
    log::info!("Duration:         {} ms", elapsed.as_millis());
    if !elapsed.is_zero() && frames_sent > 0 {
        log::info!(
            "Effective rate:   {:.0} frames/sec",
            frames_sent as f64 / elapsed.as_secs_f64()
        );
    }

    Ok(())
}
