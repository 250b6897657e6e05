//! Shared helpers for the backend's integration tests: quiet tracing,
//! problem-details assertions and collision-free test data.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
