//! `keyscope` crate (library surface).
//!
//! The primary entrypoint for end users is the `keyscope` binary (HTTP service + CLI).
//! This library exists so the router and config plumbing can be embedded and tested
//! without spawning the binary.

pub mod config;
pub mod server;

pub use keyscope_core as core;
pub use keyscope_local as local;
