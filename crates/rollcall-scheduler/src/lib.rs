//! # Rollcall Scheduler
//!
//! Fires the daily check-in prompts at fixed local wall-clock times.
//!
//! ## Architecture
//! ```text
//! Scheduler (tokio interval)
//!   ├── DailyTrigger: 09:00 → morning prompt (random pick of 3)
//!   ├── DailyTrigger: 18:00 → evening prompt (random pick of 3)
//!   └── on fire → dispatch callback → Prompt Dispatcher
//! ```
//!
//! A failed dispatch is logged; the trigger still moves on to the next
//! day's occurrence.

pub mod cron;
pub mod engine;
pub mod tasks;

pub use engine::{SchedulerEngine, spawn_scheduler};
pub use tasks::{DailyTrigger, FiredPrompt};
