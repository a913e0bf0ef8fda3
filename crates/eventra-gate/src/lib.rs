//! Eventra Gate — request-level authorization.
//!
//! Pure decision logic: the HTTP transport applies the returned
//! [`GateOutcome`]; nothing here binds sockets or performs I/O. The
//! gate enforces policy at URL-path granularity, the [`guard`] tiers at
//! per-procedure granularity.

pub mod config;
pub mod gate;
pub mod guard;
pub mod route;

pub use config::GateConfig;
pub use gate::{GateOutcome, RequestGate};
pub use guard::{GuardError, GuardTier};
pub use route::RouteTarget;
