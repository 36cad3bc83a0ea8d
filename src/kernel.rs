//! # Kernel
//!
//! Top-level initialization and public API for EqOS: owns the global
//! scheduler instance and exposes its control surface to the host firmware.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► kernel::init()        ← Reset the global scheduler
//!         ├─► kernel::create_task() ← Register tasks (×N), including
//!         │                           kernel::system_task as a periodic task
//!         └─► loop { kernel::execute(&clock, None) }
//! ```
//!
//! There is no `kernel::start()`: with no preemption there is nothing to
//! launch beyond the first call to `execute` — the host's bare-metal main
//! loop calls it directly, forever.

use crate::clock::Clock;
use crate::scheduler::{DebugSink, Scheduler, SchedulerError, TaskId};
use crate::task::{TaskBody, TaskConfig};

#[cfg(feature = "task-statistics")]
use crate::task::TaskInfo;

// ---------------------------------------------------------------------------
// Global scheduler instance
// ---------------------------------------------------------------------------

/// Global scheduler instance.
///
/// # Safety
/// Accessed only through `SCHEDULER_PTR`, set once by `init()`. With
/// preemption out of scope there is exactly one execution context (the
/// bare-metal main loop) that ever dereferences it, including reentrantly
/// through [`system_task`] while a dispatch from [`execute`] is still on the
/// stack — never from an interrupt handler.
static mut SCHEDULER: Scheduler = Scheduler::new();

/// Raw pointer to the global scheduler. Kept so that a plain `fn()` task
/// body — in particular `system_task` below — can reach `&mut Scheduler`
/// without a closure or trait object, matching the signature every other
/// task body has.
///
/// # Safety
/// Set once during `init()`, read only from the main-loop execution context.
static mut SCHEDULER_PTR: *mut Scheduler = core::ptr::null_mut();

/// Raw pointer to the host's debug sink for the call to [`execute`]
/// currently on the stack, or `None` outside of one. The same problem as
/// `SCHEDULER_PTR` applies: `system_task`, dispatched as a bare `fn()` task
/// body, cannot close over the `&mut dyn DebugSink` its caller passed into
/// `execute`, so it is threaded through here instead.
///
/// # Safety
/// Set at the top of `execute`, cleared at the bottom. Read only from
/// `system_task` while it runs as a dispatched body nested inside that same
/// `execute` call — never outside that window, and never from an interrupt
/// handler.
static mut DEBUG_SINK_PTR: Option<*mut dyn DebugSink> = None;

// ---------------------------------------------------------------------------
// Kernel API
// ---------------------------------------------------------------------------

/// Initializes the EqOS kernel. Must be called before any other kernel
/// function, exactly once, from the main thread.
pub fn init() {
    unsafe {
        SCHEDULER = Scheduler::new();
        SCHEDULER_PTR = &mut SCHEDULER as *mut Scheduler;
        (*SCHEDULER_PTR).init();
    }
    log::trace!("eqos: kernel initialized");
}

/// Registers a new task with the scheduler. Returns the task's id, or
/// [`SchedulerError::TaskTableFull`] once `MAX_TASKS` has been reached.
pub fn create_task(config: TaskConfig, body: TaskBody) -> Result<TaskId, SchedulerError> {
    unsafe { (*SCHEDULER_PTR).create_task(config, body) }
}

/// Enables or disables a task; a no-op for an invalid id.
pub fn set_enabled(id: TaskId, enabled: bool) {
    unsafe { (*SCHEDULER_PTR).set_enabled(id, enabled) }
}

/// Sets a task's desired period, clamped to the configured floor; a no-op
/// for an invalid id.
pub fn set_period(id: TaskId, micros: u32) {
    unsafe { (*SCHEDULER_PTR).set_period(id, micros) }
}

/// Returns a task's last observed inter-dispatch delta, or `0` for an
/// invalid id.
pub fn get_delta(id: TaskId) -> u32 {
    unsafe { (*SCHEDULER_PTR).get_delta(id) }
}

/// Returns a snapshot of a task's configuration and statistics.
#[cfg(feature = "task-statistics")]
pub fn get_info(id: TaskId) -> Option<TaskInfo> {
    unsafe { (*SCHEDULER_PTR).get_info(id) }
}

/// The most recently computed system-wide load percentage.
pub fn average_system_load_percent() -> u16 {
    unsafe { (*SCHEDULER_PTR).average_system_load_percent() }
}

/// The current realtime guard interval, in microseconds. Also mirrored into
/// debug slot 2 after every pass in which the system task runs, for hosts
/// that have wired up a [`crate::scheduler::DebugSink`].
pub fn realtime_guard_interval() -> u32 {
    unsafe { (*SCHEDULER_PTR).realtime_guard_interval() }
}

/// Runs one scheduling pass. Intended to be called in a tight loop from
/// `main`; returns whether a task was dispatched, which callers may use to
/// decide whether to `wfi()` before the next pass.
///
/// `debug` is stashed into `DEBUG_SINK_PTR` for the duration of the call so
/// that [`system_task`] can reach it too, should the system task itself be
/// the one dispatched this pass.
pub fn execute(clock: &impl Clock, debug: Option<&mut dyn DebugSink>) -> bool {
    unsafe {
        DEBUG_SINK_PTR = debug.map(|sink| sink as *mut dyn DebugSink);
        let debug_reborrow = DEBUG_SINK_PTR.map(|sink| &mut *sink);
        let dispatched = (*SCHEDULER_PTR).execute(clock, debug_reborrow);
        DEBUG_SINK_PTR = None;
        dispatched
    }
}

/// Recomputes the realtime guard interval and load percentage, writing it to
/// debug slot 2 when the `scheduler-debug` feature is enabled. Registered by
/// the host as an ordinary periodic task body — see `main.rs` — rather than
/// being invoked specially from `execute`.
///
/// # Safety-relevant note
/// This reenters `SCHEDULER_PTR` (and, for the debug sink, `DEBUG_SINK_PTR`)
/// while [`execute`] still has a dispatch in progress (this function *is*
/// the body of the dispatched task). That is sound only because
/// `Scheduler::execute` never holds a live borrow of `self` — nor of its
/// `debug` argument — across a task body call; see the comment at the
/// dispatch site in `scheduler.rs`.
pub fn system_task() {
    unsafe {
        let debug = DEBUG_SINK_PTR.map(|sink| &mut *sink);
        (*SCHEDULER_PTR).run_system_task(debug);
    }
}
