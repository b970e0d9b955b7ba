//! Domain model for tasks and the onboarding profile.
//!
//! # Responsibility
//! - Define the canonical records owned by the core stores.
//! - Keep title normalization in one place so every write path agrees.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` that is never reused.
//! - Task categories come from a closed set; there are no freeform values.

pub mod profile;
pub mod task;
