//! Stateful stores over a key-value backend.
//!
//! # Responsibility
//! - `TaskStore` owns the task collection and its mutation protocol.
//! - `ProfileStore` owns the onboarding profile.
//!
//! # Invariants
//! - Each store writes only its own key.
//! - Backend failures degrade to session-only state; they are never fatal.

pub mod codec;
pub mod profile_store;
pub mod task_store;
