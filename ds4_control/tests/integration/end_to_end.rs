//! Full node paths: wire frames in, robot traffic out.

use super::*;
use ds4_common::transport::VelocityCommand;
use ds4_control::input_reader::{parse_frame, spawn_reader};
use ds4_control::mailbox::InputMailbox;
use ds4_control::transport::TransportRegistry;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Instant;

const HOLD_HALF_FORWARD: &str =
    r#"{"buttons":[0,0,0,0,0,0],"axes":[0.0,0.0,1.0,0.0,0.5,-1.0,0.0]}"#;

#[test]
fn two_robots_half_forward_reaches_first_robot() {
    let (mut cl, rec) = control_loop(2, ReleasePolicy::Optimistic);
    let frame = parse_frame(HOLD_HALF_FORWARD).unwrap();

    cl.on_input(frame, Instant::now());
    cl.tick();

    assert_eq!(
        rec.published(),
        vec![("/r1/cmd_vel".to_string(), VelocityCommand::new(0.1, 0.0))]
    );
}

#[test]
fn running_loop_dispatches_then_stops_on_release() {
    let (transport, rec) = RecordingTransport::new();
    let config = NodeConfig {
        tick_rate_hz: 100.0,
        settle_delay_ms: 20,
        ..config(2, ReleasePolicy::Optimistic)
    };
    let mut cl = ControlLoop::new(&config, Box::new(transport));
    let mailbox = Arc::new(InputMailbox::new());
    let running = AtomicBool::new(true);

    let operator = {
        let mailbox = Arc::clone(&mailbox);
        thread::spawn(move || {
            mailbox.post(hold(0.5, 0.0));
            thread::sleep(Duration::from_millis(100));
            mailbox.post(neutral());
            thread::sleep(Duration::from_millis(20));
            mailbox.close();
        })
    };

    let stats = cl.run(&mailbox, &running);
    operator.join().unwrap();

    assert_eq!(
        rec.published_on("/r1/cmd_vel"),
        vec![VelocityCommand::new(0.1, 0.0), VelocityCommand::ZERO]
    );
    assert!(rec.published_on("/r2/cmd_vel").is_empty());
    assert!(stats.ticks > 0);
    assert_eq!(stats.commands, 1);
    assert!(!cl.machine().is_stopping());

    cl.shutdown();
    assert_eq!(rec.published_on("/r2/cmd_vel"), vec![VelocityCommand::ZERO]);
}

#[test]
fn input_end_releases_a_held_trigger() {
    let (transport, rec) = RecordingTransport::new();
    let mut cl = ControlLoop::new(&config(1, ReleasePolicy::Optimistic), Box::new(transport));
    let mailbox = Arc::new(InputMailbox::new());
    let running = AtomicBool::new(true);

    let input = format!("{HOLD_HALF_FORWARD}\n");
    let reader = spawn_reader(Cursor::new(input), Arc::clone(&mailbox)).unwrap();
    reader.join().unwrap();

    cl.run(&mailbox, &running);

    assert!(!cl.machine().addressed_slot().is_holding());
    assert!(!cl.machine().is_stopping());
    assert_eq!(rec.published_on("/cmd_vel").last(), Some(&VelocityCommand::ZERO));
}

#[test]
fn cleared_running_flag_stops_the_loop() {
    let (mut cl, _) = control_loop(1, ReleasePolicy::Optimistic);
    let mailbox = InputMailbox::new();
    let running = AtomicBool::new(false);
    let stats = cl.run(&mailbox, &running);
    assert_eq!(stats.ticks, 0);
}

#[test]
fn simulation_transport_through_the_registry() {
    let section: toml::Table = toml::from_str(r#"fail_services = ["/r2/hard_stop"]"#).unwrap();
    let transport = TransportRegistry::with_builtin()
        .create("simulation", &section)
        .unwrap();
    let mut cl = ControlLoop::new(&config(2, ReleasePolicy::Optimistic), transport);
    let now = Instant::now();

    cl.on_input(triangle(), now);
    assert!(cl.machine().addressed_slot().is_emergency_stopped());

    cl.on_input(select(-1.0), now);
    let events = cl.on_input(triangle(), now);
    assert!(events.iter().any(|e| e.is_error()));
    assert!(!cl.machine().addressed_slot().is_emergency_stopped());
    assert_eq!(cl.registry().transport_name(), "simulation");
}
