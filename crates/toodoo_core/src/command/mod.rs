//! Free-text and voice command handling.
//!
//! # See also
//! - `speech` for the listening session that produces utterances.

pub mod interpreter;
