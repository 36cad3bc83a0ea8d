//! # Task Descriptor
//!
//! Defines the task model for EqOS. Each task is a row in the scheduler's
//! fixed table: an immutable configuration and body chosen at registration
//! time, and mutable scheduling state updated every pass.
//!
//! ## Capability Objects
//!
//! Rather than a single `taskFunc` pointer plus a nullable `checkFunc`
//! pointer (the original firmware's C struct), a task's body is modelled as
//! [`TaskBody`]: time-driven tasks carry only a `run` function, event-driven
//! tasks carry a `check` predicate alongside it. The enum makes the two
//! scheduling branches in [`crate::scheduler::Scheduler::execute`] mutually
//! exclusive at the type level instead of by convention.

use crate::config::PERIOD_FLOOR;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Scheduling priority tier. The numeric value is used directly as the
/// multiplier in the starvation score (`1 + priority * age`); `Idle`'s value
/// of `0` collapses the score to the `+1` baseline so an idle-priority task
/// is always beaten by any ready task of a higher tier.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Idle = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Realtime = 4,
}

impl Priority {
    /// Whether this tier is exempt from the realtime guard interval — a
    /// ready realtime task is always eligible for selection.
    #[inline]
    pub const fn is_realtime(self) -> bool {
        matches!(self, Priority::Realtime)
    }
}

// ---------------------------------------------------------------------------
// Task body — capability objects
// ---------------------------------------------------------------------------

/// The work a task performs, and how its readiness is determined.
#[derive(Clone, Copy)]
pub enum TaskBody {
    /// A time-driven task: becomes ready when its ideal execution time has
    /// passed, independent of any external condition.
    Periodic(fn()),
    /// An event-driven task: becomes ready when `check` returns `true`.
    /// `check` receives the time elapsed since the task's last dispatch and
    /// may itself consume time; that cost is attributed to the scheduling
    /// pass, not to the task.
    EventDriven { check: fn(u32) -> bool, run: fn() },
}

impl TaskBody {
    #[inline]
    pub(crate) fn run(&self) {
        match self {
            TaskBody::Periodic(run) => run(),
            TaskBody::EventDriven { run, .. } => run(),
        }
    }

    #[inline]
    pub(crate) fn check(&self) -> Option<fn(u32) -> bool> {
        match self {
            TaskBody::Periodic(_) => None,
            TaskBody::EventDriven { check, .. } => Some(*check),
        }
    }
}

// ---------------------------------------------------------------------------
// Task configuration (immutable after registration)
// ---------------------------------------------------------------------------

/// Static identity and scheduling parameters for a task, fixed at
/// registration time apart from `desired_period`, which may be adjusted
/// later through [`crate::scheduler::Scheduler::set_period`].
#[derive(Debug, Clone, Copy)]
pub struct TaskConfig {
    /// Human-readable identifier, used only for introspection (`get_info`).
    pub name: &'static str,
    /// Scheduling priority tier; immutable for the life of the task.
    pub priority: Priority,
    /// Target inter-invocation interval, in microseconds. Always clamped to
    /// `>= PERIOD_FLOOR` — see [`TaskConfig::clamp_period`].
    pub desired_period: u32,
}

impl TaskConfig {
    /// Clamps a requested period to the scheduler's 10 kHz ceiling.
    #[inline]
    pub const fn clamp_period(period: u32) -> u32 {
        if period < PERIOD_FLOOR {
            PERIOD_FLOOR
        } else {
            period
        }
    }
}

// ---------------------------------------------------------------------------
// Mutable scheduling state
// ---------------------------------------------------------------------------

/// Per-task mutable scheduling fields, updated by the selector every pass.
#[derive(Debug, Clone, Copy)]
pub struct TaskState {
    /// Whether the task may currently be considered for dispatch at all.
    pub is_enabled: bool,
    /// True once the task has become ready this cycle but has not yet been
    /// dispatched.
    pub is_waiting_to_be_ran: bool,
    /// The timestamp at which a time-driven task *should* run next, kept
    /// phase-aligned with `desired_period` to prevent drift. For
    /// event-driven tasks this is simply stamped to `currentTime` when the
    /// check function fires.
    pub last_ideal_execution_time: u32,
    /// Timestamp of the last actual dispatch.
    pub last_executed_at: u32,
    /// `last_executed_at - previous last_executed_at`, observable via
    /// `get_delta`.
    pub task_latest_delta_time: u32,
}

impl TaskState {
    pub const fn new() -> Self {
        Self {
            is_enabled: false,
            is_waiting_to_be_ran: false,
            last_ideal_execution_time: 0,
            last_executed_at: 0,
            task_latest_delta_time: 0,
        }
    }

    /// Applied by `Scheduler::init`: clears enablement and readiness without
    /// disturbing accumulated statistics, matching the original firmware's
    /// `schedulerInit` (which leaves execution-time fields untouched).
    pub fn reset_for_init(&mut self) {
        self.is_enabled = false;
        self.is_waiting_to_be_ran = false;
        self.last_ideal_execution_time = 0;
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Execution-time statistics
// ---------------------------------------------------------------------------

/// Exponentially-averaged and (optionally) cumulative execution-time
/// statistics for a task. The average is required unconditionally — the
/// realtime guard depends on it. Max/total are gated behind the
/// `task-statistics` feature so memory-constrained builds can omit the
/// bookkeeping (they stay present as `Option<u32>`, always `None` when the
/// feature is off, so the struct layout does not change across feature
/// combinations).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionStats {
    /// EMA of observed task runtimes, weight `1 / EMA_DENOMINATOR`.
    pub average_execution_time: u32,
    /// Largest observed runtime, if `task-statistics` is enabled.
    pub max_execution_time: Option<u32>,
    /// Sum of all observed runtimes, if `task-statistics` is enabled.
    /// Diagnostic only — may wrap on a long-running system.
    pub total_execution_time: Option<u32>,
}

impl ExecutionStats {
    pub const fn new() -> Self {
        Self {
            average_execution_time: 0,
            max_execution_time: None,
            total_execution_time: None,
        }
    }

    /// Folds one observed execution time into the statistics.
    pub fn record(&mut self, execution_time: u32) {
        self.average_execution_time = (self.average_execution_time
            * (crate::config::EMA_DENOMINATOR - 1)
            + execution_time)
            / crate::config::EMA_DENOMINATOR;

        #[cfg(feature = "task-statistics")]
        {
            self.max_execution_time =
                Some(self.max_execution_time.unwrap_or(0).max(execution_time));
            self.total_execution_time = Some(
                self.total_execution_time
                    .unwrap_or(0)
                    .wrapping_add(execution_time),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Task descriptor
// ---------------------------------------------------------------------------

/// A fully registered task: immutable configuration and body, plus the
/// mutable state and statistics the scheduler maintains every pass.
#[derive(Clone, Copy)]
pub struct TaskDescriptor {
    pub config: TaskConfig,
    pub body: TaskBody,
    pub state: TaskState,
    pub stats: ExecutionStats,
}

impl TaskDescriptor {
    pub fn new(config: TaskConfig, body: TaskBody) -> Self {
        let mut config = config;
        config.desired_period = TaskConfig::clamp_period(config.desired_period);
        Self {
            config,
            body,
            state: TaskState::new(),
            stats: ExecutionStats::new(),
        }
    }
}

/// Snapshot returned by `get_info`, decoupled from the live `TaskDescriptor`
/// so introspection never hands out a reference into scheduler-owned state.
#[derive(Debug, Clone, Copy)]
pub struct TaskInfo {
    pub name: &'static str,
    pub is_enabled: bool,
    pub desired_period: u32,
    pub priority: Priority,
    pub max_execution_time: Option<u32>,
    pub total_execution_time: Option<u32>,
    pub average_execution_time: u32,
    pub latest_delta_time: u32,
}

impl From<&TaskDescriptor> for TaskInfo {
    fn from(task: &TaskDescriptor) -> Self {
        Self {
            name: task.config.name,
            is_enabled: task.state.is_enabled,
            desired_period: task.config.desired_period,
            priority: task.config.priority,
            max_execution_time: task.stats.max_execution_time,
            total_execution_time: task.stats.total_execution_time,
            average_execution_time: task.stats.average_execution_time,
            latest_delta_time: task.state.task_latest_delta_time,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_task() {}

    #[test]
    fn period_is_clamped_to_floor() {
        let config = TaskConfig {
            name: "test",
            priority: Priority::Low,
            desired_period: 10,
        };
        let descriptor = TaskDescriptor::new(config, TaskBody::Periodic(dummy_task));
        assert_eq!(descriptor.config.desired_period, PERIOD_FLOOR);
    }

    #[test]
    fn period_above_floor_is_unchanged() {
        let config = TaskConfig {
            name: "test",
            priority: Priority::Low,
            desired_period: 30_000,
        };
        let descriptor = TaskDescriptor::new(config, TaskBody::Periodic(dummy_task));
        assert_eq!(descriptor.config.desired_period, 30_000);
    }

    #[test]
    fn init_clears_readiness_but_not_statistics() {
        let config = TaskConfig {
            name: "test",
            priority: Priority::Low,
            desired_period: 30_000,
        };
        let mut descriptor = TaskDescriptor::new(config, TaskBody::Periodic(dummy_task));
        descriptor.state.is_enabled = true;
        descriptor.state.is_waiting_to_be_ran = true;
        descriptor.state.last_ideal_execution_time = 12345;
        descriptor.stats.average_execution_time = 999;

        descriptor.state.reset_for_init();

        assert!(!descriptor.state.is_enabled);
        assert!(!descriptor.state.is_waiting_to_be_ran);
        assert_eq!(descriptor.state.last_ideal_execution_time, 0);
        assert_eq!(descriptor.stats.average_execution_time, 999);
    }

    // Truncating integer division means the EMA does not converge all the way
    // to the sample: `(31*a + 200) / 32` has a fixed point anywhere in
    // `169..=200`, and climbing from 0 lands on the lowest one, 169.
    #[test]
    fn ema_converges_towards_stable_sample() {
        let mut stats = ExecutionStats::new();
        for _ in 0..200 {
            stats.record(200);
        }
        assert_eq!(stats.average_execution_time, 169);
    }

    #[test]
    fn priority_ordering_matches_numeric_rank() {
        assert!(Priority::Realtime > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert!(Priority::Low > Priority::Idle);
        assert_eq!(Priority::Idle as u8, 0);
        assert!(Priority::Realtime.is_realtime());
        assert!(!Priority::High.is_realtime());
    }

    #[test]
    fn event_driven_body_exposes_check() {
        fn ready(_delta: u32) -> bool {
            true
        }
        let body = TaskBody::EventDriven {
            check: ready,
            run: dummy_task,
        };
        assert!(body.check().is_some());

        let periodic = TaskBody::Periodic(dummy_task);
        assert!(periodic.check().is_none());
    }
}
