//! Worker fleet, rate-limit fabric, churn model, and the reconciling
//! load controller that ties them to a declared [`Configuration`].
//!
//! This crate owns everything between "operator changed a number" and
//! "the right number of paced, churning connections are now running
//! the current scenario" — it knows nothing about HTTP, WebSockets, or
//! how the configuration arrived.

mod churn;
mod config;
mod controller;
mod rate_limiter;
mod worker;

pub use config::Configuration;
pub use controller::LoadController;
pub use rate_limiter::RateLimiter;
pub use worker::OperationKind;
