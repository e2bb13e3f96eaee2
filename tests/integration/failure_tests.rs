//! Error propagation from client calls and fault reporting from drivers.

use pwm_rgb_led::app::events::{DriverSource, LedEvent};
use pwm_rgb_led::app::ports::Services;
use pwm_rgb_led::error::{FadeError, PwmError, ResourceError};
use pwm_rgb_led::{Error, FadeDirection, LedConfig, Mode, ModeKind, RgbLed};

use crate::mock_hw::{HwCall, ManualTasks, ManualTimers, MockHardware, RecordingSink, Rig};

#[test]
fn fade_install_failure_is_recoverable() {
    let rig = Rig::cathode();
    rig.hw.fail_install(Some(-1));

    let err = rig
        .led
        .fade_start(500, FadeDirection::Up, false, 255, 0)
        .unwrap_err();

    assert_eq!(err, Error::Fade(FadeError::InstallFailed(-1)));
    let snap = rig.led.snapshot();
    assert_eq!(snap.mode, Mode::Static);
    assert!(!snap.fade_installed);

    // The LED keeps working, and a later start can still succeed.
    rig.led.set(255, 0, 0, 255).unwrap();
    rig.hw.fail_install(None);
    rig.led
        .fade_start(500, FadeDirection::Up, false, 255, 0)
        .unwrap();
    assert!(rig.led.snapshot().fade_installed);
}

#[test]
fn timer_failure_leaves_led_static_and_releases_fade() {
    let rig = Rig::cathode();
    rig.timers.fail_next(true);

    let err = rig
        .led
        .fade_start(500, FadeDirection::Loop, false, 255, 0)
        .unwrap_err();

    assert_eq!(err, Error::Resource(ResourceError::TimerUnavailable));
    assert_eq!(rig.led.snapshot().mode, Mode::Static);
    assert!(!rig.led.snapshot().fade_installed);
    assert_eq!(rig.hw.count(&HwCall::UninstallFade), 1);
}

#[test]
fn task_spawn_failure_leaves_led_static() {
    let rig = Rig::cathode();
    rig.tasks.fail_next(true);

    let err = rig.led.blink_start(100, 100).unwrap_err();

    assert_eq!(err, Error::Resource(ResourceError::TaskSpawnFailed));
    let snap = rig.led.snapshot();
    assert_eq!(snap.mode, Mode::Static);
    assert!(!snap.blink_running);
    assert_eq!(
        rig.sink.mode_changes(),
        vec![
            (ModeKind::Static, ModeKind::Blinking),
            (ModeKind::Blinking, ModeKind::Static),
        ]
    );
}

#[test]
fn pwm_write_failure_is_returned_to_the_caller() {
    let rig = Rig::cathode();
    rig.hw.fail_pin(Some(17));
    rig.hw.clear_calls();

    let err = rig.led.set(255, 255, 255, 255).unwrap_err();

    assert_eq!(err, Error::Pwm(PwmError::WriteFailed { pin: 17 }));
    let pins: Vec<_> = rig.hw.pwm_writes().iter().map(|w| w.0).collect();
    assert_eq!(pins, vec![16, 17]);
}

#[test]
fn init_fails_when_a_pin_cannot_be_written() {
    let hw = MockHardware::new();
    hw.fail_pin(Some(16));
    let services = Services {
        timers: Box::new(ManualTimers::default()),
        tasks: Box::new(ManualTasks::default()),
        sink: Box::new(RecordingSink::default()),
    };

    let result = RgbLed::init(&LedConfig::default(), hw, services);

    assert!(matches!(
        result,
        Err(Error::Pwm(PwmError::WriteFailed { pin: 16 }))
    ));
}

#[test]
fn blink_write_failure_is_reported_not_fatal() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.led.blink_start(100, 200).unwrap();
    rig.hw.fail_pin(Some(18));

    assert!(rig.tasks.step_only().is_some());
    assert!(rig.tasks.step_only().is_some());

    let events = rig.sink.events();
    let faults: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, LedEvent::DriverFault { source: DriverSource::BlinkTask, .. }))
        .collect();
    assert_eq!(faults.len(), 2);
    assert!(rig.led.snapshot().blink_running);
}

#[test]
fn per_channel_fade_failure_is_reported_and_others_proceed() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 0).unwrap();
    rig.bind_all();
    rig.hw.fail_fade_on(Some(1));

    rig.led
        .fade_start(500, FadeDirection::Up, false, 255, 0)
        .unwrap();

    assert_eq!(rig.hw.count(&HwCall::StartFade { channel: 0 }), 1);
    assert_eq!(rig.hw.count(&HwCall::StartFade { channel: 1 }), 0);
    assert_eq!(rig.hw.count(&HwCall::StartFade { channel: 2 }), 1);
    assert_eq!(
        rig.sink.faults(),
        vec![Error::Fade(FadeError::ProgramFailed { channel: 1 })]
    );
}

#[test]
fn fade_tick_failure_is_reported() {
    let rig = Rig::cathode();
    rig.led.set(255, 255, 255, 255).unwrap();
    rig.led
        .fade_start(100, FadeDirection::BlinkRapid, false, 255, 0)
        .unwrap();
    rig.hw.fail_pin(Some(16));

    rig.timers.fire_only();

    assert!(rig.sink.events().iter().any(|e| matches!(
        e,
        LedEvent::DriverFault {
            source: DriverSource::FadeTimer,
            error: Error::Pwm(PwmError::WriteFailed { pin: 16 }),
        }
    )));
    assert_eq!(rig.timers.live().len(), 1);
}

#[test]
fn deinit_attempts_every_pin_and_returns_first_error() {
    let rig = Rig::cathode();
    rig.hw.fail_pin(Some(16));
    rig.hw.clear_calls();

    let Rig { led, hw, .. } = rig;
    let err = led.deinit().unwrap_err();

    assert_eq!(err, Error::Pwm(PwmError::WriteFailed { pin: 16 }));
    assert_eq!(
        hw.pwm_writes(),
        vec![(16, 0, 0.0), (17, 0, 0.0), (18, 0, 0.0)]
    );
}
