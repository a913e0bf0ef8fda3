//! Milestone domain model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milestone lifecycle state.
///
/// `NoTasks`, `InProgress`, and `ReadyForApproval` are derived from the
/// task statuses on every task mutation. `Approved` and
/// `ChangesRequested` are set only by the role-gated review actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MilestoneStatus {
    NoTasks,
    InProgress,
    ReadyForApproval,
    Approved,
    ChangesRequested,
}

impl MilestoneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneStatus::NoTasks => "NoTasks",
            MilestoneStatus::InProgress => "InProgress",
            MilestoneStatus::ReadyForApproval => "ReadyForApproval",
            MilestoneStatus::Approved => "Approved",
            MilestoneStatus::ChangesRequested => "ChangesRequested",
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    /// Owning client; may review the milestone alongside staff.
    pub owner_id: Option<Uuid>,
    /// Derived completion percentage (0..=100). Never hand-edited;
    /// recomputed on every task-status mutation.
    pub progress: u8,
    pub status: MilestoneStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMilestone {
    pub project_id: Uuid,
    pub name: String,
    pub owner_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateMilestone {
    pub name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub owner_id: Option<Option<Uuid>>,
    pub progress: Option<u8>,
    pub status: Option<MilestoneStatus>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub due_date: Option<Option<DateTime<Utc>>>,
}
