//! Storage abstraction for Resonate.
//!
//! This crate provides the [`MusicStore`] trait covering users, profiles,
//! friendships, the catalog, playlists, likes, and listening history,
//! along with an in-memory implementation that enforces the same
//! uniqueness invariants a relational schema would.

mod error;
mod memory;
mod traits;

pub use error::*;
pub use memory::*;
pub use traits::*;
