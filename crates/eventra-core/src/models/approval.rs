//! Approval log domain model.
//!
//! Append-only: entries are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApprovalAction {
    Approved,
    ChangesRequested,
}

impl ApprovalAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalAction::Approved => "Approved",
            ApprovalAction::ChangesRequested => "ChangesRequested",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalLogEntry {
    pub id: Uuid,
    pub milestone_id: Uuid,
    pub actor_id: Uuid,
    pub action: ApprovalAction,
    pub comment: Option<String>,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApprovalLogEntry {
    pub milestone_id: Uuid,
    pub actor_id: Uuid,
    pub action: ApprovalAction,
    pub comment: Option<String>,
    pub metadata: Option<serde_json::Value>,
}
