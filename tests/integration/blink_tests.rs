//! Blink task behaviour and its interaction with fading.

use std::time::Duration;

use pwm_rgb_led::led::mode::BlinkParams;
use pwm_rgb_led::{FadeDirection, Mode, ModeKind};

use crate::mock_hw::{approx, HwCall, Rig};

fn blink_params(rig: &Rig) -> BlinkParams {
    match rig.led.snapshot().mode {
        Mode::Blinking(p) => p,
        other => panic!("expected blinking, got {other:?}"),
    }
}

#[test]
fn blink_uninstalls_a_running_fade_first() {
    let rig = Rig::cathode();
    rig.bind_all();
    rig.led
        .fade_start(500, FadeDirection::Loop, false, 255, 0)
        .unwrap();
    assert!(rig.led.snapshot().fade_installed);
    rig.hw.clear_calls();

    rig.led.blink_start(100, 100).unwrap();

    let snap = rig.led.snapshot();
    assert!(!snap.fade_installed);
    assert!(snap.blink_running);
    assert!(rig.timers.live().is_empty());
    assert_eq!(rig.hw.calls(), vec![HwCall::UninstallFade]);
    assert_eq!(
        rig.sink.mode_changes().last(),
        Some(&(ModeKind::Fading, ModeKind::Blinking))
    );
}

#[test]
fn durations_are_clamped() {
    let rig = Rig::cathode();
    rig.led.blink_start(10, 200_000).unwrap();

    let p = blink_params(&rig);
    assert_eq!((p.on_ms, p.off_ms), (50, 100_000));
}

#[test]
fn phases_alternate_with_their_own_durations() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 200).unwrap();
    rig.led.blink_start(300, 700).unwrap();

    assert_eq!(rig.tasks.step_only(), Some(Duration::from_millis(300)));
    assert!(approx(rig.hw.last_duty(16).unwrap(), 200.0 / 255.0));

    assert_eq!(rig.tasks.step_only(), Some(Duration::from_millis(700)));
    assert!(approx(rig.hw.last_duty(16).unwrap(), 0.0));

    assert_eq!(rig.tasks.step_only(), Some(Duration::from_millis(300)));
    assert_eq!(rig.led.snapshot().brightness, 200);
}

#[test]
fn dark_led_blinks_at_full_brightness() {
    let rig = Rig::cathode();
    rig.led.set_color(0, 0, 255).unwrap();
    rig.led.blink_start(100, 100).unwrap();

    assert_eq!(blink_params(&rig).max, 255);
    rig.tasks.step_only();
    assert!(approx(rig.hw.last_duty(18).unwrap(), 1.0));
}

#[test]
fn restart_keeps_one_task_and_the_on_level() {
    let rig = Rig::cathode();
    rig.led.set(255, 0, 0, 180).unwrap();
    rig.led.blink_start(100, 100).unwrap();
    rig.tasks.step_only();
    rig.tasks.step_only();
    // Off phase: logical brightness is now 0.
    assert_eq!(rig.led.snapshot().brightness, 0);

    rig.led.blink_start(400, 400).unwrap();

    assert_eq!(rig.tasks.live().len(), 1);
    assert_eq!(blink_params(&rig).max, 180);
    assert_eq!(rig.tasks.step_only(), Some(Duration::from_millis(400)));
}

#[test]
fn task_is_spawned_with_blink_parameters() {
    let rig = Rig::cathode();
    rig.led.blink_start(100, 100).unwrap();

    let (_, spec) = rig.tasks.live()[0];
    assert_eq!(spec.name, c"led-blink");
    assert_eq!(spec.stack_bytes, 4096);
    assert_eq!(spec.priority, 1);
}

#[test]
fn blink_stop_deletes_task_and_returns_to_static() {
    let rig = Rig::cathode();
    rig.led.blink_start(100, 100).unwrap();

    rig.led.blink_stop();

    assert!(rig.tasks.live().is_empty());
    let snap = rig.led.snapshot();
    assert_eq!(snap.mode, Mode::Static);
    assert!(!snap.blink_running);
}

#[test]
fn blink_stop_without_blink_changes_nothing() {
    let rig = Rig::cathode();
    rig.hw.clear_calls();

    rig.led.blink_stop();

    assert!(rig.hw.calls().is_empty());
    assert!(rig.sink.events().is_empty());
}

#[test]
fn superseded_step_ends_its_task() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.led.blink_start(100, 100).unwrap();
    let (id, _) = rig.tasks.live()[0];
    let mut stale = rig.tasks.steal(id).unwrap();

    rig.led.blink_stop();
    rig.hw.clear_calls();

    assert_eq!(stale(), None);
    assert!(rig.hw.calls().is_empty());
}

#[test]
fn step_after_led_is_gone_ends_the_task() {
    let rig = Rig::cathode();
    rig.led.blink_start(100, 100).unwrap();
    let (id, _) = rig.tasks.live()[0];
    let mut orphan = rig.tasks.steal(id).unwrap();

    drop(rig.led);

    assert_eq!(orphan(), None);
}
