//! Adapters for external dependencies.

pub mod notes_sea;
pub mod users_sea;
