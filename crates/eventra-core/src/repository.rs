//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations live in the
//! database crate; services stay generic over these traits.

use uuid::Uuid;

use crate::error::EventraResult;
use crate::models::{
    approval::{ApprovalLogEntry, CreateApprovalLogEntry},
    milestone::{CreateMilestone, Milestone, UpdateMilestone},
    notification::{CreateNotification, Notification},
    task::{CreateTask, Task, UpdateTask},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait MilestoneRepository: Send + Sync {
    fn create(&self, input: CreateMilestone) -> impl Future<Output = EventraResult<Milestone>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = EventraResult<Milestone>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateMilestone,
    ) -> impl Future<Output = EventraResult<Milestone>> + Send;
    /// Delete the milestone and cascade to its tasks.
    fn delete(&self, id: Uuid) -> impl Future<Output = EventraResult<()>> + Send;
    fn list_by_project(
        &self,
        project_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = EventraResult<PaginatedResult<Milestone>>> + Send;
}

pub trait TaskRepository: Send + Sync {
    fn create(&self, input: CreateTask) -> impl Future<Output = EventraResult<Task>> + Send;
    fn get_by_id(
        &self,
        milestone_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = EventraResult<Task>> + Send;
    fn update(
        &self,
        milestone_id: Uuid,
        id: Uuid,
        input: UpdateTask,
    ) -> impl Future<Output = EventraResult<Task>> + Send;
    fn delete(&self, milestone_id: Uuid, id: Uuid) -> impl Future<Output = EventraResult<()>> + Send;
    /// All tasks of a milestone, unpaginated: progress recomputation
    /// needs the full set.
    fn list_by_milestone(
        &self,
        milestone_id: Uuid,
    ) -> impl Future<Output = EventraResult<Vec<Task>>> + Send;
}

pub trait NotificationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateNotification,
    ) -> impl Future<Output = EventraResult<Notification>> + Send;
    fn list_by_recipient(
        &self,
        recipient_user_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = EventraResult<PaginatedResult<Notification>>> + Send;
    /// Mark one notification read. Scoped to the recipient: only the
    /// recipient may mutate their notifications.
    fn mark_read(
        &self,
        recipient_user_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = EventraResult<Notification>> + Send;
    fn count_unread(&self, recipient_user_id: Uuid)
    -> impl Future<Output = EventraResult<u64>> + Send;
}

pub trait ApprovalLogRepository: Send + Sync {
    /// Append a new entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateApprovalLogEntry,
    ) -> impl Future<Output = EventraResult<ApprovalLogEntry>> + Send;
    fn list_by_milestone(
        &self,
        milestone_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = EventraResult<PaginatedResult<ApprovalLogEntry>>> + Send;
}
