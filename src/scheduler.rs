//! # Scheduler
//!
//! Core scheduling logic for EqOS. On every call to [`Scheduler::execute`],
//! at most one ready task is selected and run to completion — there is no
//! preemption and no concurrency between tasks.
//!
//! ## Selection Algorithm
//!
//! Each pass:
//! 1. Sample the clock once; every decision in the pass uses that value.
//! 2. Scan enabled realtime tasks to find the time until the next realtime
//!    deadline (the "realtime horizon").
//! 3. A non-realtime task may only be selected once the horizon exceeds the
//!    realtime guard interval (`realtime_guard_interval`, recomputed by
//!    [`Scheduler::run_system_task`]); realtime tasks are always eligible.
//! 4. Mark newly-ready tasks (event-driven via their `check` predicate,
//!    time-driven via their ideal execution time).
//! 5. Among ready, eligible tasks, pick the one with the highest starvation
//!    score `1 + priority * age`; ties go to the lowest table index.
//! 6. Dispatch the winner, then fold its observed runtime into its
//!    exponentially-averaged execution-time statistics.

use crate::clock::Clock;
use crate::config::{GUARD_MARGIN, GUARD_MAX, GUARD_MIN, MAX_TASKS};
use crate::task::{TaskBody, TaskConfig, TaskDescriptor};
#[cfg(feature = "task-statistics")]
use crate::task::TaskInfo;

// ---------------------------------------------------------------------------
// Control-surface identifiers
// ---------------------------------------------------------------------------

/// Identifies a task to the control surface (`set_enabled`, `set_period`,
/// `get_delta`, `get_info`). Either a non-negative table index, or [`SELF`].
pub type TaskId = i32;

/// Sentinel routing a control-surface call to whichever task is currently
/// executing. Outside of a dispatch (no task currently running), any
/// operation given `SELF` is a no-op.
pub const SELF: TaskId = -1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure modes for the scheduler's control surface. There is deliberately
/// only one: everything else (invalid id, period below floor, disabling a
/// task) is defined by spec to be a silent no-op rather than a recoverable
/// error, since this is a hot loop in a flight-control system that must
/// never fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// `create_task` was called with the task table already at `MAX_TASKS`.
    TaskTableFull,
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedulerError::TaskTableFull => write!(f, "task table is full"),
        }
    }
}

// ---------------------------------------------------------------------------
// Debug sink (spec.md §6 — four numbered slots, conditional on a feature)
// ---------------------------------------------------------------------------

/// Host-provided sink for the scheduler's debug slots. Slot 2 receives the
/// current realtime guard interval after every [`Scheduler::run_system_task`]
/// call; slot 3 receives the pass overhead (time spent outside the
/// dispatched task's own runtime) after every [`Scheduler::execute`] call.
/// Writes only happen when the `scheduler-debug` feature is enabled; without
/// it this trait is unused.
///
/// `run_system_task` runs as an ordinary dispatched [`TaskBody::Periodic`]
/// body, which carries no arguments, so [`crate::kernel::system_task`]
/// threads the sink to it through a reentrant raw-pointer indirection
/// (`kernel::DEBUG_SINK_PTR`), the same shape `kernel::SCHEDULER_PTR` already
/// uses to reach `&mut Scheduler` from a bare `fn()` task body.
pub trait DebugSink {
    fn set(&mut self, slot: usize, value: i32);
}

#[cfg(feature = "scheduler-debug")]
#[inline]
fn debug_set(sink: Option<&mut dyn DebugSink>, slot: usize, value: i32) {
    if let Some(sink) = sink {
        sink.set(slot, value);
    }
}

#[cfg(not(feature = "scheduler-debug"))]
#[inline]
fn debug_set(_sink: Option<&mut dyn DebugSink>, _slot: usize, _value: i32) {}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Owns the task table and the process-wide scheduling state that was file
/// scope in the original firmware (`currentTask`, `realtimeGuardInterval`,
/// the two pass counters, `averageSystemLoadPercent`).
pub struct Scheduler {
    tasks: [Option<TaskDescriptor>; MAX_TASKS],
    task_count: usize,
    current_task: Option<usize>,
    realtime_guard_interval: u32,
    current_scheduler_execution_passes: u32,
    current_scheduler_execution_passes_with_work: u32,
    average_system_load_percent: u16,
}

impl Scheduler {
    /// Creates an empty scheduler. The guard interval starts at `GUARD_MAX`
    /// (the most conservative setting) until `run_system_task` has run once.
    pub const fn new() -> Self {
        Self {
            tasks: [None; MAX_TASKS],
            task_count: 0,
            current_task: None,
            realtime_guard_interval: GUARD_MAX,
            current_scheduler_execution_passes: 0,
            current_scheduler_execution_passes_with_work: 0,
            average_system_load_percent: 0,
        }
    }

    /// Resets every registered task's enablement and readiness. Statistics
    /// (execution-time averages, max/total) are left untouched, matching the
    /// original firmware's `schedulerInit`.
    pub fn init(&mut self) {
        for slot in self.tasks.iter_mut().take(self.task_count) {
            if let Some(task) = slot {
                task.state.reset_for_init();
            }
        }
        self.current_task = None;
    }

    /// Registers a new task. Returns its id, or [`SchedulerError::TaskTableFull`]
    /// if `MAX_TASKS` has already been reached. Tasks are never removed once
    /// created (no dynamic deletion — see spec Non-goals).
    pub fn create_task(
        &mut self,
        config: TaskConfig,
        body: TaskBody,
    ) -> Result<TaskId, SchedulerError> {
        if self.task_count >= MAX_TASKS {
            return Err(SchedulerError::TaskTableFull);
        }
        let id = self.task_count;
        log::trace!(
            "eqos: registering task \"{}\" (priority {:?}, period {}us)",
            config.name,
            config.priority,
            config.desired_period
        );
        self.tasks[id] = Some(TaskDescriptor::new(config, body));
        self.task_count += 1;
        Ok(id as TaskId)
    }

    /// Resolves a [`TaskId`] to a table index, honouring [`SELF`]. Returns
    /// `None` for an out-of-range id or for `SELF` with no task currently
    /// executing.
    fn resolve(&self, id: TaskId) -> Option<usize> {
        if id == SELF {
            self.current_task
        } else if id >= 0 && (id as usize) < self.task_count {
            Some(id as usize)
        } else {
            None
        }
    }

    /// Enables or disables a task. A no-op for an invalid id.
    pub fn set_enabled(&mut self, id: TaskId, enabled: bool) {
        if let Some(idx) = self.resolve(id) {
            if let Some(task) = self.tasks[idx].as_mut() {
                task.state.is_enabled = enabled;
                log::trace!("eqos: task \"{}\" enabled = {}", task.config.name, enabled);
            }
        }
    }

    /// Sets a task's desired period, clamped to `PERIOD_FLOOR`. A no-op for
    /// an invalid id.
    pub fn set_period(&mut self, id: TaskId, micros: u32) {
        if let Some(idx) = self.resolve(id) {
            if let Some(task) = self.tasks[idx].as_mut() {
                task.config.desired_period = TaskConfig::clamp_period(micros);
                log::trace!(
                    "eqos: task \"{}\" period set to {}us",
                    task.config.name,
                    task.config.desired_period
                );
            }
        }
    }

    /// Returns the task's last observed inter-dispatch delta, or `0` for an
    /// invalid id.
    pub fn get_delta(&self, id: TaskId) -> u32 {
        self.resolve(id)
            .and_then(|idx| self.tasks[idx].as_ref())
            .map(|task| task.state.task_latest_delta_time)
            .unwrap_or(0)
    }

    /// Returns a snapshot of a task's configuration and statistics, or
    /// `None` for an invalid id. Compiled out entirely when the
    /// `task-statistics` feature is disabled.
    #[cfg(feature = "task-statistics")]
    pub fn get_info(&self, id: TaskId) -> Option<TaskInfo> {
        let idx = self.resolve(id)?;
        self.tasks[idx].as_ref().map(TaskInfo::from)
    }

    /// The most recently computed system-wide load percentage, updated by
    /// `run_system_task`.
    pub fn average_system_load_percent(&self) -> u16 {
        self.average_system_load_percent
    }

    /// The current realtime guard interval, in microseconds.
    pub fn realtime_guard_interval(&self) -> u32 {
        self.realtime_guard_interval
    }

    /// Performs one scheduling pass: selects at most one ready task and
    /// dispatches it to completion. Returns `true` if a task was dispatched.
    ///
    /// `debug`, when the `scheduler-debug` feature is enabled, receives the
    /// pass overhead in slot 3 (spec.md §6).
    pub fn execute(&mut self, clock: &impl Clock, mut debug: Option<&mut dyn DebugSink>) -> bool {
        let current_time = clock.now();

        // --- Realtime horizon (spec.md §4.1 step 2) ---
        let mut time_to_next_realtime_task: Option<u32> = None;
        for slot in self.tasks.iter().take(self.task_count) {
            let Some(task) = slot else { continue };
            if !task.state.is_enabled || !task.config.priority.is_realtime() {
                continue;
            }
            let next_execute_at = task
                .state
                .last_executed_at
                .wrapping_add(task.config.desired_period);
            // Signed 32-bit difference tolerates clock wraparound.
            if (current_time.wrapping_sub(next_execute_at) as i32) >= 0 {
                time_to_next_realtime_task = Some(0);
            } else {
                let interval = next_execute_at.wrapping_sub(current_time);
                time_to_next_realtime_task = Some(match time_to_next_realtime_task {
                    Some(t) => t.min(interval),
                    None => interval,
                });
            }
        }

        // --- Guard test (spec.md §4.1 step 3) ---
        let outside_guard = match time_to_next_realtime_task {
            None => true,
            Some(t) => t > self.realtime_guard_interval,
        };

        // --- Readiness + selection (spec.md §4.1 steps 4-5) ---
        let mut selected: Option<usize> = None;
        let mut best_score: u32 = 0;

        for (i, slot) in self.tasks.iter_mut().take(self.task_count).enumerate() {
            let Some(task) = slot else { continue };
            if !task.state.is_enabled {
                continue;
            }

            if !task.state.is_waiting_to_be_ran {
                match task.body.check() {
                    Some(check) => {
                        let delta_since_last_run =
                            current_time.wrapping_sub(task.state.last_executed_at);
                        if check(delta_since_last_run) {
                            task.state.last_ideal_execution_time = current_time;
                            task.state.is_waiting_to_be_ran = true;
                        }
                    }
                    None => {
                        // Plain unsigned comparison, deliberately not wrap-safe —
                        // matches the original firmware exactly (see SPEC_FULL.md
                        // Open Question OQ-4); not "fixed" here.
                        if task
                            .state
                            .last_ideal_execution_time
                            .wrapping_add(task.config.desired_period)
                            <= current_time
                        {
                            while task
                                .state
                                .last_ideal_execution_time
                                .wrapping_add(task.config.desired_period)
                                <= current_time
                            {
                                task.state.last_ideal_execution_time = task
                                    .state
                                    .last_ideal_execution_time
                                    .wrapping_add(task.config.desired_period);
                            }
                            task.state.is_waiting_to_be_ran = true;
                        }
                    }
                }
            }

            if task.state.is_waiting_to_be_ran {
                let task_age = 1 + current_time
                    .wrapping_sub(task.state.last_ideal_execution_time)
                    / task.config.desired_period;
                let starvation_priority = 1 + (task.config.priority as u32) * task_age;

                let eligible = outside_guard || task.config.priority.is_realtime();
                if eligible && starvation_priority > best_score {
                    best_score = starvation_priority;
                    selected = Some(i);
                }
            }
        }

        // --- Accounting (spec.md §4.1 step 6) ---
        self.current_scheduler_execution_passes =
            self.current_scheduler_execution_passes.wrapping_add(1);
        if selected.is_some() {
            self.current_scheduler_execution_passes_with_work = self
                .current_scheduler_execution_passes_with_work
                .wrapping_add(1);
        }

        // --- Dispatch (spec.md §4.1 step 7) ---
        let Some(idx) = selected else {
            debug_set(
                debug.as_deref_mut(),
                3,
                clock.now().wrapping_sub(current_time) as i32,
            );
            return false;
        };

        self.current_task = Some(idx);

        // Copy the (Copy) body out before releasing the borrow below, so the
        // dispatched task's own code — which may itself call back into this
        // scheduler through `crate::kernel` (the system-maintenance task does
        // exactly that) — never observes a live exclusive borrow of `self`.
        let body = self.tasks[idx].as_ref().unwrap().body;
        {
            let task = self.tasks[idx].as_mut().unwrap();
            task.state.task_latest_delta_time =
                current_time.wrapping_sub(task.state.last_executed_at);
            task.state.last_executed_at = current_time;
        }

        let before = clock.now();
        body.run();
        let after = clock.now();
        let execution_time = after.wrapping_sub(before);

        {
            let task = self.tasks[idx].as_mut().unwrap();
            task.state.is_waiting_to_be_ran = false;
            task.stats.record(execution_time);
        }

        self.current_task = None;

        debug_set(
            debug.as_deref_mut(),
            3,
            after.wrapping_sub(current_time).wrapping_sub(execution_time) as i32,
        );

        true
    }

    /// Recomputes the realtime guard interval and the system load
    /// percentage. Registered by the host as an ordinary periodic task body
    /// (see [`crate::kernel::system_task`]) — spec.md §4.3 treats this as
    /// "a task like any other", not a special case inside `execute`. `debug`,
    /// when the `scheduler-debug` feature is enabled, receives the
    /// recomputed guard interval in slot 2 (spec.md §6).
    pub fn run_system_task(&mut self, mut debug: Option<&mut dyn DebugSink>) {
        if self.current_scheduler_execution_passes > 0 {
            self.average_system_load_percent = (100
                * self.current_scheduler_execution_passes_with_work
                / self.current_scheduler_execution_passes) as u16;
            self.current_scheduler_execution_passes = 0;
            self.current_scheduler_execution_passes_with_work = 0;
        }

        let mut max_non_realtime_task_time = 0u32;
        for slot in self.tasks.iter().take(self.task_count) {
            if let Some(task) = slot {
                if !task.config.priority.is_realtime() {
                    max_non_realtime_task_time =
                        max_non_realtime_task_time.max(task.stats.average_execution_time);
                }
            }
        }
        self.realtime_guard_interval =
            max_non_realtime_task_time.clamp(GUARD_MIN, GUARD_MAX) + GUARD_MARGIN;

        debug_set(
            debug.as_deref_mut(),
            2,
            self.realtime_guard_interval as i32,
        );

        log::trace!(
            "eqos: guard interval recomputed to {}us (load {}%)",
            self.realtime_guard_interval,
            self.average_system_load_percent
        );
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only) — translated from
// original_source/src/test/unit/scheduler_unittest.cc
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::task::Priority;
    use std::cell::Cell;
    use std::thread_local;

    thread_local! {
        static SIM_TIME: Cell<u32> = Cell::new(0);
        static RX_CHECK_RETURN: Cell<bool> = Cell::new(false);
    }

    fn sim_time() -> u32 {
        SIM_TIME.with(|t| t.get())
    }

    fn set_sim_time(value: u32) {
        SIM_TIME.with(|t| t.set(value));
    }

    fn advance(delta: u32) {
        SIM_TIME.with(|t| t.set(t.get() + delta));
    }

    struct SimClock;
    impl Clock for SimClock {
        fn now(&self) -> u32 {
            sim_time()
        }
    }

    const ACCEL_RUNTIME: u32 = 200;
    fn accel_task() {
        advance(ACCEL_RUNTIME);
    }

    const RX_CHECK_COST: u32 = 34;
    const RX_RUN_COST: u32 = 12;
    fn rx_check(_delta: u32) -> bool {
        advance(RX_CHECK_COST);
        RX_CHECK_RETURN.with(|r| r.get())
    }
    fn rx_run() {
        advance(RX_RUN_COST);
    }

    const GYRO_RUNTIME: u32 = 50;
    fn gyro_task() {
        advance(GYRO_RUNTIME);
    }

    const SERIAL_RUNTIME: u32 = 30;
    fn serial_task() {
        advance(SERIAL_RUNTIME);
    }

    const TELEMETRY_RUNTIME: u32 = 16;
    fn telemetry_task() {
        advance(TELEMETRY_RUNTIME);
    }

    fn reset_harness() {
        set_sim_time(0);
        RX_CHECK_RETURN.with(|r| r.set(false));
    }

    fn accel_config(period: u32) -> TaskConfig {
        TaskConfig {
            name: "accel",
            priority: Priority::Medium,
            desired_period: period,
        }
    }

    // S1 — empty schedule: no task runs, time only advances externally.
    #[test]
    fn empty_schedule_never_dispatches() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        scheduler.init();
        let clock = SimClock;

        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 0);

        set_sim_time(30_000);
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 30_000);

        set_sim_time(3_030_000);
        assert!(!scheduler.execute(&clock, None));
        assert!(!scheduler.execute(&clock, None));
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 3_030_000);
    }

    // S2 — time-driven single task, including catch-up and disable.
    #[test]
    fn time_driven_task_dispatches_on_period_and_catches_up() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        scheduler.init();
        let clock = SimClock;

        let accel = scheduler
            .create_task(accel_config(30_000), TaskBody::Periodic(accel_task))
            .unwrap();
        scheduler.set_enabled(accel, true);

        set_sim_time(29_999);
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 29_999);

        set_sim_time(30_000);
        assert!(scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 30_000 + ACCEL_RUNTIME);

        set_sim_time(40_000);
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 40_000);

        // Missed the 60_000 slot entirely; catch-up dispatches once, and the
        // next ideal slot stays phase-aligned at 90_000.
        set_sim_time(70_000);
        assert!(scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 70_000 + ACCEL_RUNTIME);

        set_sim_time(89_999);
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 89_999);

        set_sim_time(90_000);
        assert!(scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 90_000 + ACCEL_RUNTIME);

        scheduler.set_enabled(accel, false);
        set_sim_time(500_000);
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), 500_000);
    }

    // S3 — event-driven task: check function gates dispatch every pass.
    #[test]
    fn event_driven_task_gates_on_check_every_pass() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        scheduler.init();
        let clock = SimClock;

        let rx = scheduler
            .create_task(
                TaskConfig {
                    name: "rx",
                    priority: Priority::High,
                    desired_period: 30_000,
                },
                TaskBody::EventDriven {
                    check: rx_check,
                    run: rx_run,
                },
            )
            .unwrap();
        scheduler.set_enabled(rx, true);

        let mut expected = 0u32;

        RX_CHECK_RETURN.with(|r| r.set(false));
        expected += RX_CHECK_COST;
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), expected);

        expected += RX_CHECK_COST;
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), expected);

        RX_CHECK_RETURN.with(|r| r.set(true));
        expected += RX_CHECK_COST + RX_RUN_COST;
        assert!(scheduler.execute(&clock, None));
        assert_eq!(sim_time(), expected);

        expected += RX_CHECK_COST + RX_RUN_COST;
        assert!(scheduler.execute(&clock, None));
        assert_eq!(sim_time(), expected);

        RX_CHECK_RETURN.with(|r| r.set(false));
        expected += RX_CHECK_COST;
        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), expected);
    }

    // S4 — event + realtime interaction: realtime always wins while ready,
    // RX stays isWaitingToBeRan and only dispatches once gyro is disabled.
    #[test]
    fn realtime_task_preempts_ready_event_driven_task_in_selection() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        scheduler.init();
        let clock = SimClock;

        let rx = scheduler
            .create_task(
                TaskConfig {
                    name: "rx",
                    priority: Priority::High,
                    desired_period: 30_000,
                },
                TaskBody::EventDriven {
                    check: rx_check,
                    run: rx_run,
                },
            )
            .unwrap();
        let gyro = scheduler
            .create_task(
                TaskConfig {
                    name: "gyro",
                    priority: Priority::Realtime,
                    desired_period: 1_000,
                },
                TaskBody::Periodic(gyro_task),
            )
            .unwrap();
        scheduler.set_enabled(rx, true);
        scheduler.set_enabled(gyro, true);
        RX_CHECK_RETURN.with(|r| r.set(true));

        set_sim_time(40_000);
        let mut expected = 40_000;
        assert!(scheduler.execute(&clock, None));
        expected += RX_CHECK_COST + GYRO_RUNTIME;
        assert_eq!(sim_time(), expected);

        set_sim_time(50_000);
        expected = 50_000;
        assert!(scheduler.execute(&clock, None));
        expected += GYRO_RUNTIME;
        assert_eq!(sim_time(), expected);

        scheduler.set_enabled(gyro, false);
        assert!(scheduler.execute(&clock, None));
        expected += RX_RUN_COST;
        assert_eq!(sim_time(), expected);
    }

    // S5 — five priority tiers at an equal period: strict priority order.
    #[test]
    fn equal_period_dispatches_in_strict_priority_order() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        scheduler.init();
        let clock = SimClock;

        let gyro = scheduler
            .create_task(
                TaskConfig {
                    name: "gyro",
                    priority: Priority::Realtime,
                    desired_period: 3_000,
                },
                TaskBody::Periodic(gyro_task),
            )
            .unwrap();
        let rx = scheduler
            .create_task(
                TaskConfig {
                    name: "rx",
                    priority: Priority::High,
                    desired_period: 3_000,
                },
                TaskBody::EventDriven {
                    check: rx_check,
                    run: rx_run,
                },
            )
            .unwrap();
        let accel = scheduler
            .create_task(accel_config(3_000), TaskBody::Periodic(accel_task))
            .unwrap();
        let serial = scheduler
            .create_task(
                TaskConfig {
                    name: "serial",
                    priority: Priority::Low,
                    desired_period: 3_000,
                },
                TaskBody::Periodic(serial_task),
            )
            .unwrap();
        let telemetry = scheduler
            .create_task(
                TaskConfig {
                    name: "telemetry",
                    priority: Priority::Idle,
                    desired_period: 3_000,
                },
                TaskBody::Periodic(telemetry_task),
            )
            .unwrap();

        for id in [gyro, rx, accel, serial, telemetry] {
            scheduler.set_enabled(id, true);
        }
        RX_CHECK_RETURN.with(|r| r.set(false));

        set_sim_time(2_999);
        let mut expected = 2_999;
        assert!(!scheduler.execute(&clock, None));
        expected += RX_CHECK_COST;
        assert_eq!(sim_time(), expected);

        RX_CHECK_RETURN.with(|r| r.set(true));
        set_sim_time(3_000);
        expected = 3_000;
        assert!(scheduler.execute(&clock, None));
        expected += RX_CHECK_COST + GYRO_RUNTIME;
        assert_eq!(sim_time(), expected);

        assert!(scheduler.execute(&clock, None));
        expected += RX_RUN_COST;
        assert_eq!(sim_time(), expected);

        assert!(scheduler.execute(&clock, None));
        expected += ACCEL_RUNTIME;
        assert_eq!(sim_time(), expected);

        assert!(scheduler.execute(&clock, None));
        expected += SERIAL_RUNTIME;
        assert_eq!(sim_time(), expected);

        assert!(scheduler.execute(&clock, None));
        expected += TELEMETRY_RUNTIME;
        assert_eq!(sim_time(), expected);

        assert!(!scheduler.execute(&clock, None));
        assert_eq!(sim_time(), expected);
    }

    // S6 — guard computation from non-realtime averages.
    #[test]
    fn system_task_recomputes_guard_from_worst_average() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        scheduler.init();

        fn task_20() {}
        fn task_50() {}
        fn task_400() {}

        let a = scheduler
            .create_task(
                TaskConfig {
                    name: "a",
                    priority: Priority::Low,
                    desired_period: 100,
                },
                TaskBody::Periodic(task_20),
            )
            .unwrap();
        let b = scheduler
            .create_task(
                TaskConfig {
                    name: "b",
                    priority: Priority::Medium,
                    desired_period: 100,
                },
                TaskBody::Periodic(task_50),
            )
            .unwrap();
        let c = scheduler
            .create_task(
                TaskConfig {
                    name: "c",
                    priority: Priority::High,
                    desired_period: 100,
                },
                TaskBody::Periodic(task_400),
            )
            .unwrap();

        for (id, value) in [(a, 20u32), (b, 50), (c, 400)] {
            let idx = id as usize;
            scheduler.tasks[idx].as_mut().unwrap().stats.average_execution_time = value;
        }

        scheduler.run_system_task(None);

        assert_eq!(scheduler.realtime_guard_interval(), 325);
    }

    #[test]
    fn invalid_task_id_is_a_no_op() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        scheduler.init();

        scheduler.set_enabled(9_999, true);
        scheduler.set_period(-2, 500);
        assert_eq!(scheduler.get_delta(9_999), 0);
    }

    #[test]
    fn self_sentinel_is_no_op_outside_dispatch() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        scheduler.init();

        scheduler.set_enabled(SELF, true);
        assert_eq!(scheduler.get_delta(SELF), 0);
    }

    #[test]
    fn period_below_floor_is_clamped() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        let accel = scheduler
            .create_task(accel_config(30_000), TaskBody::Periodic(accel_task))
            .unwrap();

        scheduler.set_period(accel, 5);

        #[cfg(feature = "task-statistics")]
        assert_eq!(
            scheduler.get_info(accel).unwrap().desired_period,
            crate::config::PERIOD_FLOOR
        );
    }

    #[test]
    fn create_task_fails_once_table_is_full() {
        reset_harness();
        let mut scheduler = Scheduler::new();
        for _ in 0..MAX_TASKS {
            scheduler
                .create_task(accel_config(30_000), TaskBody::Periodic(accel_task))
                .unwrap();
        }
        assert_eq!(
            scheduler.create_task(accel_config(30_000), TaskBody::Periodic(accel_task)),
            Err(SchedulerError::TaskTableFull)
        );
    }
}
