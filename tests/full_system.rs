//! Full-system test: UDP ingest loop plus live control channel
//!
//! One gateway on a loopback UDP port, one control server sharing its stats,
//! journal, and CRC flag — the same wiring the daemon does.

use prahari_gw::control::{ControlClient, ControlServer};
use prahari_gw::gateway::{Gateway, GatewayConfig};
use prahari_gw::journal::EventJournal;
use prahari_gw::sim::MeasurementGenerator;
use prahari_gw::source::UdpFrameSink;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

const UDP_PORT: u16 = 47621;

#[test]
fn ingest_control_and_crc_switch() {
    let journal = Arc::new(EventJournal::with_sink(Box::new(std::io::sink())));
    let config = GatewayConfig {
        udp_port: UDP_PORT,
        crc_enabled: true,
        ..Default::default()
    };
    let mut gateway = Gateway::new(config, Arc::clone(&journal));

    let mut control = ControlServer::new(gateway.stats(), journal, gateway.crc_flag());
    control.start(0).unwrap();
    let control_port = control.port();

    let running = gateway.running_flag();
    let shutdown = gateway.shutdown_flag();
    let stats = gateway.stats();

    let gateway_thread = std::thread::spawn(move || {
        gateway.run().unwrap();
    });

    let deadline = Instant::now() + Duration::from_secs(2);
    while !running.load(Ordering::Relaxed) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(running.load(Ordering::Relaxed), "gateway did not start");

    let sink = UdpFrameSink::connect("127.0.0.1", UDP_PORT).unwrap();
    let mut client = ControlClient::connect("127.0.0.1", control_port).unwrap();

    // Phase 1: CRC validation on, frames carry trailers; everything counts.
    let mut crc_measurer = MeasurementGenerator::new(1, 5);
    crc_measurer.set_crc(true);
    for _ in 0..20 {
        assert!(sink.send(&crc_measurer.generate_heartbeat(0)));
    }

    let deadline = Instant::now() + Duration::from_secs(2);
    while stats.global_snapshot().rx_total < 20 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    let phase1 = stats.global_snapshot();
    assert_eq!(phase1.rx_total, 20, "not all CRC frames were ingested");
    assert_eq!(phase1.crc_fail_total, 0);

    // The control channel sees the same counters.
    let response = client.send_command("GET STATS").unwrap();
    assert!(response.contains("rx_total=20"));
    assert_eq!(client.send_command("GET HEALTH").unwrap(), "HEALTH OK");

    // Phase 2: bare frames against a validating gateway come up truncated.
    let mut bare_measurer = MeasurementGenerator::new(2, 6);
    for _ in 0..5 {
        assert!(sink.send(&bare_measurer.generate_heartbeat(0)));
    }
    let deadline = Instant::now() + Duration::from_secs(2);
    while stats.global_snapshot().malformed_total < 5 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(stats.global_snapshot().malformed_total, 5);
    assert_eq!(client.send_command("GET HEALTH").unwrap(), "HEALTH ERROR");

    // Phase 3: switch CRC off over the control channel; the ingest loop
    // observes the published flag and starts accepting bare frames.
    assert_eq!(client.send_command("SET CRC=OFF").unwrap(), "OK CRC=OFF");
    let before = stats.global_snapshot().rx_total;
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut accepted = 0;
    while accepted < 5 && Instant::now() < deadline {
        sink.send(&bare_measurer.generate_heartbeat(0));
        std::thread::sleep(Duration::from_millis(20));
        accepted = stats.global_snapshot().rx_total - before;
    }
    assert!(accepted >= 5, "bare frames still rejected after SET CRC=OFF");

    shutdown.store(true, Ordering::SeqCst);
    gateway_thread.join().unwrap();
    control.stop();
}
