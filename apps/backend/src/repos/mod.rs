//! Repository functions for domain layer.

pub mod notes;
pub mod users;
