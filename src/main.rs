//! # EqOS Example Firmware
//!
//! Demonstrates the scheduler with one task per priority tier plus the
//! system maintenance task that recomputes the realtime guard interval.
//!
//! | Task | Priority | Readiness | Behavior |
//! |------|----------|-----------|----------|
//! | `telemetry_task` | Idle | 1s period | Lowest-priority housekeeping |
//! | `serial_task` | Low | 50ms period | Drains a (simulated) UART buffer |
//! | `accel_task` | Medium | 10ms period | Samples the accelerometer |
//! | `rx_task` | High | event-driven | Runs only when a packet has arrived |
//! | `gyro_pid_task` | Realtime | 1ms period | Inner control loop |
//! | `eqos::kernel::system_task` | High | 1s period | Recomputes the guard interval |

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use panic_halt as _;

use eqos::arch::cortex_m4::DwtClock;
use eqos::kernel;
use eqos::task::{Priority, TaskBody, TaskConfig};

// ---------------------------------------------------------------------------
// Task bodies
// ---------------------------------------------------------------------------

/// **Telemetry Task** (Idle priority, 1s period)
///
/// Lowest-priority housekeeping: packages and ships diagnostic counters.
/// Only ever dispatched once every higher-priority task is caught up.
fn telemetry_task() {
    // Placeholder for link-layer telemetry framing.
}

/// **Serial Task** (Low priority, 50ms period)
///
/// Drains buffered UART output. Missing a period by a cycle or two is
/// harmless — the buffer simply grows.
fn serial_task() {
    // Placeholder for UART FIFO drain.
}

/// **Accelerometer Task** (Medium priority, 10ms period)
///
/// Samples the accelerometer and updates the attitude estimator's inputs.
fn accel_task() {
    // Placeholder for accelerometer register read.
}

/// Returns whether a packet has arrived since `rx_task` last ran. `delta`
/// is the time elapsed since the last dispatch; unused here because
/// readiness depends only on the receive buffer, not on elapsed time.
fn rx_check(_delta: u32) -> bool {
    // Placeholder for a receive-buffer-not-empty check.
    false
}

/// **Receive Task** (High priority, event-driven)
///
/// Parses and dispatches an inbound packet. Only runs when `rx_check`
/// reports data waiting, so it never wastes a pass when the link is idle.
fn rx_run() {
    // Placeholder for packet parsing.
}

/// **Gyro/PID Task** (Realtime priority, 1ms period)
///
/// The inner attitude control loop: reads the gyroscope and updates the
/// PID controller's output. Always eligible for dispatch regardless of the
/// realtime guard interval.
fn gyro_pid_task() {
    // Placeholder for gyro read + PID update.
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Firmware entry point. Initializes the kernel, registers tasks, and
/// drives the scheduler from a bare loop. Does not return.
#[entry]
fn main() -> ! {
    let mut cp = cortex_m::Peripherals::take().unwrap();
    DwtClock::enable(&mut cp.DCB, &mut cp.DWT);
    let clock = DwtClock;

    kernel::init();

    kernel::create_task(
        TaskConfig {
            name: "telemetry",
            priority: Priority::Idle,
            desired_period: 1_000_000,
        },
        TaskBody::Periodic(telemetry_task),
    )
    .expect("failed to register telemetry task");

    kernel::create_task(
        TaskConfig {
            name: "serial",
            priority: Priority::Low,
            desired_period: 50_000,
        },
        TaskBody::Periodic(serial_task),
    )
    .expect("failed to register serial task");

    kernel::create_task(
        TaskConfig {
            name: "accel",
            priority: Priority::Medium,
            desired_period: 10_000,
        },
        TaskBody::Periodic(accel_task),
    )
    .expect("failed to register accel task");

    kernel::create_task(
        TaskConfig {
            name: "rx",
            priority: Priority::High,
            desired_period: 10_000,
        },
        TaskBody::EventDriven {
            check: rx_check,
            run: rx_run,
        },
    )
    .expect("failed to register rx task");

    kernel::create_task(
        TaskConfig {
            name: "gyro_pid",
            priority: Priority::Realtime,
            desired_period: 1_000,
        },
        TaskBody::Periodic(gyro_pid_task),
    )
    .expect("failed to register gyro_pid task");

    let system = kernel::create_task(
        TaskConfig {
            name: "system",
            priority: Priority::High,
            desired_period: 1_000_000,
        },
        TaskBody::Periodic(kernel::system_task),
    )
    .expect("failed to register system task");

    for id in 0..6 {
        kernel::set_enabled(id, true);
    }
    let _ = system;

    loop {
        if !kernel::execute(&clock, None) {
            cortex_m::asm::wfi();
        }
    }
}
