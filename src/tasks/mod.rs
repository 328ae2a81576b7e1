//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Auto-refresh: re-runs the weather refresh at a configurable interval

mod refresh;

pub use refresh::{
    format_remaining, RefreshCallback, RefreshFuture, RefreshScheduler, ScheduleStatus,
    DEFAULT_INTERVAL_MINUTES,
};
