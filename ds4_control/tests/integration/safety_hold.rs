//! Safety trigger hold, release edge and the zero-velocity stop sequence.

use super::*;
use ds4_common::transport::VelocityCommand;
use ds4_control::ControlEvent;
use ds4_control::registry::RobotSelector;
use std::time::Instant;

#[test]
fn release_edge_sends_one_zero_between_two_settle_delays() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
    let t0 = Instant::now();

    cl.on_input(hold(0.5, 0.5), t0);
    assert!(cl.tick().is_some());
    rec.clear();

    let events = cl.on_input(neutral(), t0);
    assert!(matches!(events[..], [ControlEvent::SafetyStop { .. }]));
    assert!(!cl.machine().addressed_slot().is_holding());

    // Still released: no second sequence.
    assert!(cl.on_input(neutral(), t0 + Duration::from_millis(10)).is_empty());

    cl.on_timer(t0 + SETTLE - Duration::from_millis(1));
    assert!(rec.published().is_empty());

    let events = cl.on_timer(t0 + SETTLE);
    assert!(matches!(events[..], [ControlEvent::StopCommandSent { .. }]));
    assert_eq!(rec.published_on("/cmd_vel"), vec![VelocityCommand::ZERO]);

    assert!(cl.machine().is_stopping());
    cl.on_timer(t0 + SETTLE * 2 - Duration::from_millis(1));
    assert!(cl.machine().is_stopping());
    cl.on_timer(t0 + SETTLE * 2);
    assert!(!cl.machine().is_stopping());

    cl.on_input(neutral(), t0 + SETTLE * 3);
    cl.on_timer(t0 + SETTLE * 3);
    assert!(cl.tick().is_none());
    assert_eq!(rec.published().len(), 1);
}

#[test]
fn teleop_waits_for_the_stop_sequence() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
    let t0 = Instant::now();

    cl.on_input(hold(1.0, 0.0), t0);
    cl.on_input(neutral(), t0);
    cl.on_input(hold(1.0, 0.0), t0 + Duration::from_millis(50));
    assert!(cl.tick().is_none());

    cl.on_timer(t0 + SETTLE);
    assert!(cl.tick().is_none());
    cl.on_timer(t0 + SETTLE * 2);

    assert!(matches!(cl.tick(), Some(ControlEvent::CommandDispatched { .. })));
    assert_eq!(
        rec.published_on("/cmd_vel"),
        vec![VelocityCommand::ZERO, VelocityCommand::new(0.2, 0.0)]
    );
}

#[test]
fn failed_zero_dispatch_is_reported_and_sequence_completes() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
    let t0 = Instant::now();
    cl.on_input(hold(0.0, 0.0), t0);
    cl.on_input(neutral(), t0);
    rec.disconnect("/cmd_vel");

    let events = cl.on_timer(t0 + SETTLE);
    assert!(matches!(events[..], [ControlEvent::StopCommandFailed { .. }]));
    cl.on_timer(t0 + SETTLE * 2);
    assert!(!cl.machine().is_stopping());
    assert_eq!(cl.stats().failures, 1);
}

#[test]
fn commands_follow_fresh_frames_only() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
    let t0 = Instant::now();

    cl.on_input(hold(1.0, 0.0), t0);
    for _ in 0..5 {
        cl.tick();
    }
    cl.on_input(hold(0.5, -1.0), t0);
    cl.tick();

    assert_eq!(
        rec.published_on("/cmd_vel"),
        vec![VelocityCommand::new(0.2, 0.0), VelocityCommand::new(0.1, -0.8)]
    );
}

#[test]
fn single_robot_ignores_the_select_axis() {
    let (mut cl, _) = control_loop(1, ReleasePolicy::Optimistic);
    for value in [-1.0, 1.0, -0.8, 0.8] {
        let events = cl.on_input(select(value), Instant::now());
        assert!(events.is_empty());
        assert_eq!(cl.machine().addressed(), RobotSelector::FIRST);
    }
}

#[test]
fn holding_robot_keeps_its_hold_when_deselected() {
    let (mut cl, rec) = control_loop(2, ReleasePolicy::Optimistic);
    let now = Instant::now();
    let second = RobotSelector::new(1, 2).unwrap();

    cl.on_input(hold(1.0, 0.0), now);
    cl.on_input(select(-1.0).with_axis(AXIS_SAFETY, -1.0), now);

    assert!(cl.machine().slot(RobotSelector::FIRST).unwrap().is_holding());
    assert!(cl.machine().slot(second).unwrap().is_holding());
    assert!(cl.tick().is_some());
    assert_eq!(rec.published_on("/r2/cmd_vel").len(), 1);
    assert!(rec.published_on("/r1/cmd_vel").is_empty());
}

#[test]
fn rapid_trigger_toggling_still_sends_zero_within_settle_delay() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
    let t0 = Instant::now();
    let step = Duration::from_millis(50);

    cl.on_input(hold(1.0, 0.0), t0);
    cl.tick();

    let mut first_release = None;
    let mut first_zero = None;
    for i in 1..=40u32 {
        let now = t0 + step * i;
        let frame = if i % 2 == 1 { neutral() } else { hold(1.0, 0.0) };
        let events = cl.on_input(frame, now);
        if first_release.is_none()
            && events.iter().any(|e| matches!(e, ControlEvent::SafetyStop { .. }))
        {
            first_release = Some(now);
        }
        cl.on_timer(now);
        cl.tick();
        if first_zero.is_none() && rec.published_on("/cmd_vel").contains(&VelocityCommand::ZERO) {
            first_zero = Some(now);
        }
    }

    let first_release = first_release.unwrap();
    let first_zero = first_zero.expect("no stop command while toggling");
    assert!(first_zero <= first_release + SETTLE + step);
    assert!(
        rec.published_on("/cmd_vel")
            .iter()
            .filter(|cmd| cmd.is_zero())
            .count()
            > 1
    );
}

#[test]
fn close_release_edges_share_one_timely_zero() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
    let t0 = Instant::now();
    let gap = Duration::from_millis(100);

    cl.on_input(hold(1.0, 0.0), t0);
    cl.on_input(neutral(), t0);
    cl.on_input(hold(1.0, 0.0), t0 + gap / 2);
    cl.on_input(neutral(), t0 + gap);

    cl.on_timer(t0 + SETTLE);
    assert_eq!(rec.published_on("/cmd_vel"), vec![VelocityCommand::ZERO]);

    cl.on_timer(t0 + SETTLE * 2);
    assert!(!cl.machine().is_stopping());
}
