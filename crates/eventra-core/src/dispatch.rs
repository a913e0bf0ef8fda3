//! Notification dispatcher contract.
//!
//! The workflow invokes the dispatcher on milestone state transitions.
//! Dispatch is best-effort from the workflow's perspective: the caller
//! logs a failure and never rolls back the triggering transition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventraResult;

/// Milestone transitions that fan out notifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkflowEventKind {
    ReadyForApproval,
    Approved,
    ChangesRequested,
}

impl WorkflowEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowEventKind::ReadyForApproval => "ReadyForApproval",
            WorkflowEventKind::Approved => "Approved",
            WorkflowEventKind::ChangesRequested => "ChangesRequested",
        }
    }
}

/// Payload handed to the dispatcher on a milestone state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub kind: WorkflowEventKind,
    pub milestone_id: Uuid,
    pub milestone_name: String,
    pub project_id: Uuid,
    pub comment: Option<String>,
}

pub trait NotificationDispatcher: Send + Sync {
    /// Deliver `event` to each recipient.
    ///
    /// Fire-and-forget contract: the caller does not retry; durable
    /// delivery is the implementor's concern.
    fn dispatch(
        &self,
        recipients: &[Uuid],
        event: &WorkflowEvent,
    ) -> impl Future<Output = EventraResult<()>> + Send;
}
