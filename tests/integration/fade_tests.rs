//! Hardware fades, the toggle timer and mode exclusivity.

use std::time::Duration;

use pwm_rgb_led::app::events::LedEvent;
use pwm_rgb_led::{FadeDirection, Mode, ModeKind};

use crate::mock_hw::{approx, HwCall, Rig};

fn position(calls: &[HwCall], pred: impl Fn(&HwCall) -> bool) -> usize {
    calls.iter().position(pred).expect("call not found")
}

#[test]
fn fade_stops_a_running_blink_first() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.led.blink_start(200, 200).unwrap();
    assert_eq!(rig.tasks.live().len(), 1);

    rig.led
        .fade_start(1000, FadeDirection::Up, false, 255, 0)
        .unwrap();

    assert!(rig.tasks.live().is_empty());
    let snap = rig.led.snapshot();
    assert!(!snap.blink_running);
    assert_eq!(snap.mode.kind(), ModeKind::Fading);
    assert_eq!(
        rig.sink.mode_changes(),
        vec![
            (ModeKind::Static, ModeKind::Blinking),
            (ModeKind::Blinking, ModeKind::Fading),
        ]
    );
}

#[test]
fn up_with_reset_jumps_to_min_before_fading_to_max() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 128).unwrap();
    rig.bind_all();
    rig.hw.clear_calls();

    rig.led
        .fade_start(1000, FadeDirection::Up, true, 200, 10)
        .unwrap();

    let calls = rig.hw.calls();
    let install = position(&calls, |c| *c == HwCall::InstallFade);
    let reset = position(&calls, |c| matches!(c, HwCall::SetPwm { .. }));
    let fade = position(&calls, |c| matches!(c, HwCall::ProgramFade { .. }));
    assert!(install < reset && reset < fade);

    for pin in [16, 17, 18] {
        assert!(approx(rig.hw.last_duty(pin).unwrap(), 10.0 / 255.0));
    }
    let fades = rig.hw.fades();
    assert_eq!(fades.len(), 3);
    for (i, (channel, duty, duration)) in fades.into_iter().enumerate() {
        assert_eq!(channel as usize, i);
        assert!(approx(duty, 200.0 / 255.0));
        assert_eq!(duration, 1000);
    }
    assert_eq!(rig.hw.count(&HwCall::StartFade { channel: 0 }), 1);
    assert_eq!(rig.led.snapshot().brightness, 200);
    // A single fade needs no timer.
    assert!(rig.timers.live().is_empty());
}

#[test]
fn up_without_reset_fades_from_current_output() {
    let rig = Rig::cathode();
    rig.led.set(255, 0, 0, 100).unwrap();
    rig.bind_all();
    rig.hw.clear_calls();

    rig.led
        .fade_start(300, FadeDirection::Up, false, 255, 0)
        .unwrap();

    assert!(rig.hw.pwm_writes().is_empty());
    assert_eq!(rig.hw.fades(), vec![(0, 1.0, 300)]);
}

#[test]
fn down_fades_towards_min() {
    let rig = Rig::cathode();
    rig.led.set(0, 255, 0, 255).unwrap();
    rig.bind_all();

    rig.led
        .fade_start(400, FadeDirection::Down, false, 255, 51)
        .unwrap();

    let fades = rig.hw.fades();
    assert_eq!(fades.len(), 1);
    assert_eq!(fades[0].0, 1);
    assert!(approx(fades[0].1, 0.2));
}

#[test]
fn unbound_channels_are_skipped_until_bound() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 0).unwrap();

    rig.led
        .fade_start(500, FadeDirection::Up, false, 255, 0)
        .unwrap();
    assert!(rig.hw.fades().is_empty());

    rig.bind_all();
    rig.led.set_brightness(128).unwrap();
    assert_eq!(rig.hw.fades().len(), 3);
    assert_eq!(rig.led.snapshot().channels, [Some(0), Some(1), Some(2)]);
}

#[test]
fn foreign_and_unbound_negative_assignments_are_ignored() {
    let rig = Rig::cathode();
    rig.led.on_channel_assigned(pwm_rgb_led::ChannelAssignment { pin: 4, channel: 3 });
    rig.led.on_channel_assigned(pwm_rgb_led::ChannelAssignment { pin: 16, channel: -1 });

    assert_eq!(rig.led.snapshot().channels, [None, None, None]);
    assert!(rig.sink.events().is_empty());
}

#[test]
fn released_channel_is_no_longer_faded() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 0).unwrap();
    rig.bind_all();
    rig.sink.clear();

    rig.led.on_channel_assigned(pwm_rgb_led::ChannelAssignment { pin: 17, channel: -1 });

    assert_eq!(rig.led.snapshot().channels, [Some(0), None, Some(2)]);
    assert_eq!(rig.sink.events(), vec![LedEvent::ChannelUnbound { pin: 17 }]);

    rig.hw.clear_calls();
    rig.led
        .fade_start(500, FadeDirection::Up, false, 255, 0)
        .unwrap();
    assert_eq!(rig.hw.count(&HwCall::StartFade { channel: 0 }), 1);
    assert_eq!(rig.hw.count(&HwCall::StartFade { channel: 1 }), 0);
    assert_eq!(rig.hw.count(&HwCall::StartFade { channel: 2 }), 1);
}

#[test]
fn loop_timer_alternates_min_and_max() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.bind_all();
    rig.hw.clear_calls();

    rig.led
        .fade_start(500, FadeDirection::Loop, false, 200, 20)
        .unwrap();

    let live = rig.timers.live();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].1, Duration::from_millis(501));
    assert!(rig.hw.fades().is_empty());

    rig.timers.fire_only();
    assert_eq!(rig.led.snapshot().brightness, 20);
    assert!(approx(rig.hw.fades()[0].1, 20.0 / 255.0));

    rig.timers.fire_only();
    assert_eq!(rig.led.snapshot().brightness, 200);
    assert!(approx(rig.hw.fades()[3].1, 200.0 / 255.0));

    rig.timers.fire_only();
    assert_eq!(rig.led.snapshot().brightness, 20);
}

#[test]
fn blink_direction_toggles_with_direct_writes() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.bind_all();
    rig.hw.clear_calls();

    rig.led
        .fade_start(100, FadeDirection::Blink, false, 255, 0)
        .unwrap();
    rig.timers.fire_only();

    assert!(rig.hw.fades().is_empty());
    assert!(approx(rig.hw.last_duty(16).unwrap(), 0.0));
    rig.timers.fire_only();
    assert!(approx(rig.hw.last_duty(16).unwrap(), 1.0));
}

#[test]
fn restarting_a_loop_keeps_one_timer_and_one_install() {
    let rig = Rig::cathode();
    rig.bind_all();

    rig.led
        .fade_start(500, FadeDirection::Loop, false, 255, 0)
        .unwrap();
    rig.led
        .fade_start(800, FadeDirection::Loop, false, 255, 0)
        .unwrap();

    let live = rig.timers.live();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].1, Duration::from_millis(801));
    assert_eq!(rig.hw.count(&HwCall::InstallFade), 1);
}

#[test]
fn fade_stop_tears_down_timer_and_service() {
    let rig = Rig::cathode();
    rig.bind_all();
    rig.led
        .fade_start(500, FadeDirection::Loop, false, 255, 0)
        .unwrap();

    rig.led.fade_stop();

    assert!(rig.timers.live().is_empty());
    let snap = rig.led.snapshot();
    assert_eq!(snap.mode, Mode::Static);
    assert!(!snap.fade_installed);
    assert_eq!(rig.hw.count(&HwCall::UninstallFade), 1);
}

#[test]
fn repeated_fade_stop_is_a_no_op() {
    let rig = Rig::cathode();
    rig.hw.clear_calls();
    let before = rig.led.snapshot();

    rig.led.fade_stop();
    rig.led.fade_stop();

    assert!(rig.hw.calls().is_empty());
    assert!(rig.sink.events().is_empty());
    assert_eq!(rig.led.snapshot(), before);
}

#[test]
fn fade_stop_after_stop_does_nothing_more() {
    let rig = Rig::cathode();
    rig.led
        .fade_start(500, FadeDirection::Up, false, 255, 0)
        .unwrap();
    rig.led.fade_stop();
    rig.hw.clear_calls();
    rig.sink.clear();

    rig.led.fade_stop();

    assert!(rig.hw.calls().is_empty());
    assert!(rig.sink.events().is_empty());
}

#[test]
fn off_direction_stops_fading() {
    let rig = Rig::cathode();
    rig.led
        .fade_start(500, FadeDirection::Loop, false, 255, 0)
        .unwrap();

    rig.led
        .fade_start(500, FadeDirection::Off, false, 255, 0)
        .unwrap();

    assert!(rig.timers.live().is_empty());
    assert_eq!(rig.led.snapshot().mode, Mode::Static);
    assert!(!rig.led.snapshot().fade_installed);
}

#[test]
fn off_direction_stops_a_running_blink() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.led.blink_start(100, 100).unwrap();
    rig.sink.clear();

    rig.led
        .fade_start(500, FadeDirection::Off, false, 255, 0)
        .unwrap();

    let snap = rig.led.snapshot();
    assert_eq!(snap.mode, Mode::Static);
    assert!(!snap.blink_running);
    assert!(rig.tasks.live().is_empty());
    assert_eq!(
        rig.sink.mode_changes(),
        vec![(ModeKind::Blinking, ModeKind::Static)]
    );

    // A fresh blink starts from the logical brightness again.
    rig.led.set_brightness(90).unwrap();
    rig.led.blink_start(100, 100).unwrap();
    assert!(matches!(rig.led.snapshot().mode, Mode::Blinking(p) if p.max == 90));
}

#[test]
fn tick_in_flight_after_stop_is_ignored() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.bind_all();
    rig.led
        .fade_start(500, FadeDirection::Loop, false, 255, 0)
        .unwrap();
    let (id, _) = rig.timers.live()[0];
    let mut stale = rig.timers.steal(id).unwrap();

    rig.led.fade_stop();
    rig.hw.clear_calls();
    stale();

    assert!(rig.hw.calls().is_empty());
    assert_eq!(rig.led.snapshot().brightness, 255);
}

#[test]
fn tick_from_replaced_timer_is_ignored() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.bind_all();
    rig.led
        .fade_start(500, FadeDirection::Loop, false, 255, 0)
        .unwrap();
    let (id, _) = rig.timers.live()[0];
    let mut stale = rig.timers.steal(id).unwrap();

    rig.led
        .fade_start(500, FadeDirection::Loop, false, 100, 50)
        .unwrap();
    stale();

    assert_eq!(rig.led.snapshot().brightness, 255);
    rig.timers.fire_only();
    assert_eq!(rig.led.snapshot().brightness, 50);
}
