//! Raw LEDC peripheral calls.
//!
//! Timer/channel configuration, duty writes and the hardware fade
//! service, using ESP-IDF sys calls. Channel and timer *allocation* is
//! not done here; see [`crate::adapters::ledc`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: programs the LEDC low-speed group.
//! On host/test: every call succeeds without touching anything, unless
//! a unit test has queued a timer configuration fault.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::config::LEDC_DUTY_BITS;
use crate::pins::Gpio;

/// LEDC channels in the low-speed group.
pub const LEDC_CHANNELS: usize = 8;
/// LEDC timers in the low-speed group.
pub const LEDC_TIMERS: usize = 4;

/// Largest raw duty value at [`LEDC_DUTY_BITS`] resolution.
pub const MAX_RAW_DUTY: u32 = (1 << LEDC_DUTY_BITS) - 1;

/// Convert a `[0, 1]` duty fraction into a raw LEDC duty value.
pub fn duty_to_raw(duty: f32) -> u32 {
    (duty.clamp(0.0, 1.0) * MAX_RAW_DUTY as f32).round() as u32
}

#[cfg(target_os = "espidf")]
const SPEED_MODE: ledc_mode_t = ledc_mode_t_LEDC_LOW_SPEED_MODE;

#[cfg(target_os = "espidf")]
fn check(ret: esp_err_t) -> Result<(), i32> {
    if ret == ESP_OK as esp_err_t { Ok(()) } else { Err(ret) }
}

// ── Timers / channels ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn configure_timer(timer: u8, freq_hz: u32) -> Result<(), i32> {
    let cfg = ledc_timer_config_t {
        speed_mode: SPEED_MODE,
        timer_num: timer as ledc_timer_t,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
        freq_hz,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: plain register configuration; the config struct outlives the call.
    check(unsafe { ledc_timer_config(&cfg) })
}

#[cfg(not(target_os = "espidf"))]
std::thread_local! {
    static HOST_TIMER_FAULT: core::cell::Cell<Option<i32>> = const { core::cell::Cell::new(None) };
}

/// Make the next host `configure_timer` on this thread fail with `rc`.
#[cfg(all(test, not(target_os = "espidf")))]
pub(crate) fn fail_next_timer_config(rc: i32) {
    HOST_TIMER_FAULT.set(Some(rc));
}

#[cfg(not(target_os = "espidf"))]
pub fn configure_timer(_timer: u8, _freq_hz: u32) -> Result<(), i32> {
    HOST_TIMER_FAULT.take().map_or(Ok(()), Err)
}

#[cfg(target_os = "espidf")]
pub fn configure_channel(channel: u8, timer: u8, gpio: Gpio) -> Result<(), i32> {
    let cfg = ledc_channel_config_t {
        speed_mode: SPEED_MODE,
        channel: channel as ledc_channel_t,
        timer_sel: timer as ledc_timer_t,
        gpio_num: gpio,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    // SAFETY: as above.
    check(unsafe { ledc_channel_config(&cfg) })
}

#[cfg(not(target_os = "espidf"))]
pub fn configure_channel(_channel: u8, _timer: u8, _gpio: Gpio) -> Result<(), i32> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn set_duty(channel: u8, raw: u32) -> Result<(), i32> {
    // SAFETY: channel was configured by configure_channel(); callers
    // serialise through the LED lock.
    unsafe {
        check(ledc_set_duty(SPEED_MODE, channel as ledc_channel_t, raw))?;
        check(ledc_update_duty(SPEED_MODE, channel as ledc_channel_t))
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn set_duty(_channel: u8, _raw: u32) -> Result<(), i32> {
    Ok(())
}

/// Stop PWM output on a channel, idling low.
#[cfg(target_os = "espidf")]
pub fn stop(channel: u8) -> Result<(), i32> {
    // SAFETY: as above.
    check(unsafe { ledc_stop(SPEED_MODE, channel as ledc_channel_t, 0) })
}

#[cfg(not(target_os = "espidf"))]
pub fn stop(_channel: u8) -> Result<(), i32> {
    Ok(())
}

// ── Hardware fade service ─────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn fade_install() -> Result<(), i32> {
    // SAFETY: installs the global LEDC fade ISR; paired with fade_uninstall().
    check(unsafe { ledc_fade_func_install(0) })
}

#[cfg(not(target_os = "espidf"))]
pub fn fade_install() -> Result<(), i32> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn fade_uninstall() {
    // SAFETY: no-op if the service is not installed.
    unsafe { ledc_fade_func_uninstall() };
}

#[cfg(not(target_os = "espidf"))]
pub fn fade_uninstall() {}

#[cfg(target_os = "espidf")]
pub fn fade_program(channel: u8, raw: u32, duration_ms: u32) -> Result<(), i32> {
    let ms = i32::try_from(duration_ms).unwrap_or(i32::MAX);
    // SAFETY: requires fade_install(); the caller only fades while installed.
    check(unsafe { ledc_set_fade_with_time(SPEED_MODE, channel as ledc_channel_t, raw, ms) })
}

#[cfg(not(target_os = "espidf"))]
pub fn fade_program(_channel: u8, _raw: u32, _duration_ms: u32) -> Result<(), i32> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn fade_start(channel: u8) -> Result<(), i32> {
    // SAFETY: as above; NO_WAIT returns immediately.
    check(unsafe {
        ledc_fade_start(SPEED_MODE, channel as ledc_channel_t, ledc_fade_mode_t_LEDC_FADE_NO_WAIT)
    })
}

#[cfg(not(target_os = "espidf"))]
pub fn fade_start(_channel: u8) -> Result<(), i32> {
    Ok(())
}
