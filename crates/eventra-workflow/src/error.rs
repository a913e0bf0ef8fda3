//! Workflow error types.

use eventra_core::error::EventraError;
use eventra_core::models::milestone::MilestoneStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("cannot {attempted} a milestone in state {from}")]
    InvalidTransition {
        from: MilestoneStatus,
        attempted: &'static str,
    },

    #[error("caller may not review this milestone")]
    NotAReviewer,
}

impl From<WorkflowError> for EventraError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { from, attempted } => {
                EventraError::InvalidTransition {
                    from: from.to_string(),
                    attempted: attempted.to_string(),
                }
            }
            WorkflowError::NotAReviewer => EventraError::Forbidden {
                reason: err.to_string(),
            },
        }
    }
}
