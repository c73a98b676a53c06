//! Broker test support utilities
//!
//! Shared helpers for the broker's unit and integration tests: unified
//! logging initialization and Problem Details assertions.

pub mod problem_details;
pub mod test_logging;
