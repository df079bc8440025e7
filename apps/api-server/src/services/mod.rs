//! Server-side services.

pub mod media;
