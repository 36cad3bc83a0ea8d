//! # EqOS Configuration
//!
//! Compile-time constants governing the scheduler's selection policy.
//! All limits are fixed at compile time — no dynamic allocation.

/// Maximum number of tasks the scheduler can manage simultaneously.
/// This bounds the static task table. Increase with care — every slot
/// is reserved whether or not a task is ever registered into it.
pub const MAX_TASKS: usize = 16;

/// Floor on `desired_period`, in microseconds (10 kHz ceiling). Any
/// attempt to set a shorter period is silently clamped up to this value
/// to prevent a misconfigured task from clogging the scheduler.
pub const PERIOD_FLOOR: u32 = 100;

/// Denominator of the exponential moving average applied to observed
/// task execution times (`avg <- (avg * (N-1) + sample) / N`, N = this
/// constant). Matches the original firmware's `* 31 + sample) / 32`.
pub const EMA_DENOMINATOR: u32 = 32;

/// Lower clamp on the realtime guard interval, in microseconds, before
/// the fixed margin is added.
pub const GUARD_MIN: u32 = 10;

/// Upper clamp on the realtime guard interval, in microseconds, before
/// the fixed margin is added. Also the guard's initial value (before
/// the system task has run for the first time) — conservative, so a
/// freshly booted scheduler never dispatches non-realtime work too
/// close to a realtime deadline.
pub const GUARD_MAX: u32 = 300;

/// Fixed margin added on top of the clamped worst non-realtime average,
/// in microseconds, to form the realtime guard interval.
pub const GUARD_MARGIN: u32 = 25;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
/// Used only by the optional `arch::cortex_m4::DwtClock` to convert the
/// DWT cycle counter into microseconds; the core scheduler is otherwise
/// clock-source-agnostic.
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;
