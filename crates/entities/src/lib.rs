//! Core entity definitions for Resonate.
//!
//! This crate defines all the core data types used across the Resonate
//! backend: users and profiles, the friendship graph, the music catalog,
//! playlists, and listening history.

mod catalog;
mod friendship;
mod history;
mod playlist;
mod profile;
mod user;

pub use catalog::*;
pub use friendship::*;
pub use history::*;
pub use playlist::*;
pub use profile::*;
pub use user::*;
