//! User Weather - random user cards with live local weather
//!
//! Loads random user profiles, geocodes their city and attaches the current
//! weather. Provider calls are retried with backoff, results are cached with
//! a TTL, and a scheduler keeps the weather fresh.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fanout;
pub mod models;
pub mod retry;
pub mod services;
pub mod tasks;

pub use api::AppState;
pub use cache::ExpiringCache;
pub use config::Config;
pub use dashboard::Dashboard;
pub use fanout::{fetch_all, FanOutResult};
pub use retry::{with_retry, RetryExecutor, RetryPolicy};
pub use tasks::RefreshScheduler;
