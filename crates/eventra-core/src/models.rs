//! Domain models for Eventra.
//!
//! These are the core types shared across all crates.

pub mod approval;
pub mod identity;
pub mod milestone;
pub mod notification;
pub mod task;
