//! # EqOS — Equilibrium Operating System
//!
//! A cooperative, priority-aware task scheduler for soft-real-time embedded
//! control loops on ARM Cortex-M4 microcontrollers.
//!
//! ## Overview
//!
//! Every call to [`kernel::execute`] selects at most one ready task and
//! runs it to completion — there is no preemption, no task stacks, and no
//! blocking between tasks. Selection balances two concerns:
//!
//! - **Realtime tasks never wait** on a non-realtime task's turn.
//! - **No ready task starves indefinitely**: a task's effective priority
//!   grows the longer it has been waiting past its ideal run time.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    Application Tasks                    │
//! ├────────────────────────────────────────────────────────┤
//! │                 Kernel API (kernel.rs)                  │
//! │        init() · create_task() · execute() · system_task │
//! ├──────────────────────────┬────────────────────────────┤
//! │      Scheduler            │    Clock Collaborator      │
//! │      scheduler.rs         │    clock.rs                │
//! │      ─ execute()          │    ─ Clock::now()          │
//! │      ─ run_system_task()  │                            │
//! ├──────────────────────────┴────────────────────────────┤
//! │              Task Model (task.rs)                       │
//! │    TaskDescriptor · TaskBody · TaskState · Stats        │
//! ├────────────────────────────────────────────────────────┤
//! │            Arch Port (arch/cortex_m4.rs)                │
//! │                 DWT cycle-counter Clock                │
//! ├────────────────────────────────────────────────────────┤
//! │         ARM Cortex-M4 Hardware (Thumb-2)                │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Selection Policy
//!
//! A task's starvation score is `1 + priority * age`, where `age` grows by
//! one for every whole `desired_period` the task has been waiting past its
//! last ideal execution time. Non-realtime tasks are additionally gated by
//! a realtime guard interval — recomputed by [`kernel::system_task`] from
//! the worst-case non-realtime execution-time average — so that a
//! low-priority task is never dispatched close enough to a realtime
//! deadline to jeopardize it.
//!
//! ## Memory Model
//!
//! - **No heap**: all state is statically allocated.
//! - **No `alloc`**: pure `core`, plus `log` (`default-features = false`)
//!   for structured tracing.
//! - **Fixed-size task table**: `[Option<TaskDescriptor>; MAX_TASKS]`.
//! - **No per-task stacks**: tasks run to completion on the caller's stack.

#![no_std]

pub mod arch;
pub mod clock;
pub mod config;
pub mod kernel;
pub mod scheduler;
pub mod task;
