//! Eventra Workflow — the milestone approval workflow.
//!
//! [`MilestoneService`] owns the lifecycle: task mutations recompute
//! the derived progress synchronously, full completion raises the
//! milestone to ready-for-approval, and role-gated review actions
//! approve it or send it back with requested changes, notifying
//! stakeholders on each transition.

pub mod error;
pub mod progress;
pub mod service;

pub use error::WorkflowError;
pub use progress::{derive_status, effective_status, milestone_progress};
pub use service::{MilestoneService, PersistingDispatcher};
