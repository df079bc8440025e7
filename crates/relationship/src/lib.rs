//! Friendship state machine for Resonate.
//!
//! This crate owns the friend-request lifecycle: send, accept, reject,
//! unfriend, and status derivation. It is a standalone service over any
//! [`music_store::MusicStore`], keyed by user identifiers; nothing is
//! attached to the user type itself.

mod engine;
mod error;

pub use engine::*;
pub use error::*;
