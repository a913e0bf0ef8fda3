//! Eventra Core — domain models, the role policy engine, error types,
//! and the repository/dispatcher contracts shared across all crates.
//!
//! This crate performs no I/O. Persistence lives in `eventra-db`,
//! request-level enforcement in `eventra-gate`, and the approval
//! workflow in `eventra-workflow`.

pub mod dispatch;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
