//! Hard stop latch: engage, release policies and motion suppression.

use super::*;
use ds4_control::ControlEvent;
use ds4_control::registry::RobotSelector;
use std::time::Instant;

#[test]
fn failing_trigger_leaves_robot_unlatched_with_one_error() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
    rec.disconnect("/hard_stop");

    let events = cl.on_input(triangle(), Instant::now());

    assert!(!cl.machine().addressed_slot().is_emergency_stopped());
    assert_eq!(events.iter().filter(|e| e.is_error()).count(), 1);
    assert_eq!(events.len(), 1);
    assert_eq!(rec.calls(), vec!["/hard_stop".to_string()]);
}

#[test]
fn optimistic_release_clears_latch_whatever_the_outcome() {
    for refuse in [false, true] {
        let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
        let now = Instant::now();
        cl.on_input(triangle(), now);
        assert!(cl.machine().addressed_slot().is_emergency_stopped());

        if refuse {
            rec.refuse("/disable_hard_stop");
        }
        let events = cl.on_input(release_combo(), now);

        assert!(!cl.machine().addressed_slot().is_emergency_stopped());
        assert_eq!(events.len(), 1);
        if refuse {
            assert!(matches!(events[0], ControlEvent::HardStopReleaseFailed { .. }));
        } else {
            assert!(matches!(events[0], ControlEvent::HardStopReleased { .. }));
        }
    }
}

#[test]
fn confirmed_release_waits_for_the_service() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Confirmed);
    let now = Instant::now();
    cl.on_input(triangle(), now);

    rec.disconnect("/disable_hard_stop");
    cl.on_input(release_combo(), now);
    assert!(cl.machine().addressed_slot().is_emergency_stopped());

    rec.restore("/disable_hard_stop");
    cl.on_input(release_combo(), now);
    assert!(!cl.machine().addressed_slot().is_emergency_stopped());
}

#[test]
fn hold_resumes_on_next_frame_after_release() {
    let (mut cl, rec) = control_loop(1, ReleasePolicy::Optimistic);
    let now = Instant::now();
    cl.on_input(hold(1.0, 0.0), now);
    cl.on_input(hold(1.0, 0.0).with_button(BUTTON_TRIANGLE, true), now);
    cl.on_input(release_combo().with_axis(AXIS_SAFETY, -1.0), now);
    assert!(cl.tick().is_none());

    cl.on_input(hold(1.0, 0.0), now);
    assert!(matches!(cl.tick(), Some(ControlEvent::CommandDispatched { .. })));
    assert_eq!(rec.published_on("/cmd_vel").len(), 1);
}

#[test]
fn hard_stop_only_affects_the_addressed_robot() {
    let (mut cl, rec) = control_loop(2, ReleasePolicy::Optimistic);
    let now = Instant::now();
    let second = RobotSelector::new(1, 2).unwrap();

    cl.on_input(select(-1.0), now);
    cl.on_input(triangle(), now);
    assert!(cl.machine().slot(second).unwrap().is_emergency_stopped());

    cl.on_input(select(1.0), now);
    cl.on_input(hold(0.5, 0.0), now);
    assert!(cl.tick().is_some());
    assert_eq!(rec.published_on("/r1/cmd_vel").len(), 1);
    assert!(rec.published_on("/r2/cmd_vel").is_empty());
}

/// Deterministic frame generator covering every control combination.
struct FrameSource(u64);

impl FrameSource {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn frame(&mut self) -> InputSnapshot {
        let base = match self.next() % 6 {
            0 => neutral(),
            1 => triangle(),
            2 => release_combo(),
            3 => hold(1.0, -1.0),
            4 => select(1.0),
            _ => select(-1.0),
        };
        if self.next() % 3 == 0 {
            base.with_axis(AXIS_SAFETY, -1.0)
        } else {
            base
        }
    }
}

#[test]
fn no_velocity_reaches_a_hard_stopped_robot() {
    for seed in [1u64, 7, 42, 1234] {
        let (mut cl, rec) = control_loop(2, ReleasePolicy::Optimistic);
        let mut source = FrameSource(seed);
        let t0 = Instant::now();

        for step in 0..2_000u32 {
            let now = t0 + Duration::from_millis(u64::from(step) * 20);
            cl.on_input(source.frame(), now);

            let latched: Vec<(String, bool)> = (0..2)
                .filter_map(|idx| RobotSelector::new(idx, 2))
                .map(|robot| {
                    let channel = cl.registry().channels(robot).unwrap().cmd_vel.clone();
                    let stopped = cl.machine().slot(robot).unwrap().is_emergency_stopped();
                    (channel, stopped)
                })
                .collect();
            let before = rec.published().len();

            cl.on_timer(now);
            cl.tick();

            for (channel, _) in rec.published()[before..].iter() {
                let stopped = latched
                    .iter()
                    .any(|(ch, stopped)| ch == channel && *stopped);
                assert!(!stopped, "seed {seed} step {step}: velocity on {channel} while hard-stopped");
            }
        }
    }
}
