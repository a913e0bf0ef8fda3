//! Milestone workflow service — task mutation, progress recomputation,
//! and the approval flow.

use std::collections::BTreeSet;

use eventra_core::dispatch::{NotificationDispatcher, WorkflowEvent, WorkflowEventKind};
use eventra_core::error::EventraResult;
use eventra_core::models::approval::{ApprovalAction, ApprovalLogEntry, CreateApprovalLogEntry};
use eventra_core::models::identity::{Identity, Role};
use eventra_core::models::milestone::{CreateMilestone, Milestone, MilestoneStatus, UpdateMilestone};
use eventra_core::models::notification::CreateNotification;
use eventra_core::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use eventra_core::repository::{
    ApprovalLogRepository, MilestoneRepository, NotificationRepository, PaginatedResult,
    Pagination, TaskRepository,
};
use tracing::warn;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::progress;

/// Milestone workflow service.
///
/// Generic over the repository and dispatcher implementations so the
/// workflow has no dependency on the database crate.
pub struct MilestoneService<M, T, A, D>
where
    M: MilestoneRepository,
    T: TaskRepository,
    A: ApprovalLogRepository,
    D: NotificationDispatcher,
{
    milestones: M,
    tasks: T,
    approvals: A,
    dispatcher: D,
}

impl<M, T, A, D> MilestoneService<M, T, A, D>
where
    M: MilestoneRepository,
    T: TaskRepository,
    A: ApprovalLogRepository,
    D: NotificationDispatcher,
{
    pub fn new(milestones: M, tasks: T, approvals: A, dispatcher: D) -> Self {
        Self {
            milestones,
            tasks,
            approvals,
            dispatcher,
        }
    }

    pub async fn create_milestone(&self, input: CreateMilestone) -> EventraResult<Milestone> {
        self.milestones.create(input).await
    }

    pub async fn get_milestone(&self, id: Uuid) -> EventraResult<Milestone> {
        self.milestones.get_by_id(id).await
    }

    pub async fn add_task(&self, input: CreateTask) -> EventraResult<Task> {
        // Validates milestone existence before creating the task.
        let milestone = self.milestones.get_by_id(input.milestone_id).await?;
        let task = self.tasks.create(input).await?;
        self.recompute(&milestone).await?;
        Ok(task)
    }

    pub async fn list_tasks(&self, milestone_id: Uuid) -> EventraResult<Vec<Task>> {
        self.tasks.list_by_milestone(milestone_id).await
    }

    /// Change a task's status and synchronously recompute the
    /// milestone's derived progress and lifecycle state.
    pub async fn set_task_status(
        &self,
        milestone_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> EventraResult<Milestone> {
        let milestone = self.milestones.get_by_id(milestone_id).await?;
        self.tasks
            .update(
                milestone_id,
                task_id,
                UpdateTask {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;
        self.recompute(&milestone).await
    }

    /// Re-derive progress with no task change. Idempotent: a second
    /// call yields the same milestone state.
    pub async fn refresh(&self, milestone_id: Uuid) -> EventraResult<Milestone> {
        let milestone = self.milestones.get_by_id(milestone_id).await?;
        self.recompute(&milestone).await
    }

    /// Approve a milestone that is ready for approval.
    pub async fn approve(
        &self,
        milestone_id: Uuid,
        reviewer: &Identity,
        comment: Option<String>,
    ) -> EventraResult<Milestone> {
        self.review(milestone_id, reviewer, ApprovalAction::Approved, comment)
            .await
    }

    /// Send a ready-for-approval milestone back for revision.
    pub async fn request_changes(
        &self,
        milestone_id: Uuid,
        reviewer: &Identity,
        comment: Option<String>,
    ) -> EventraResult<Milestone> {
        self.review(
            milestone_id,
            reviewer,
            ApprovalAction::ChangesRequested,
            comment,
        )
        .await
    }

    pub async fn approval_history(
        &self,
        milestone_id: Uuid,
        pagination: Pagination,
    ) -> EventraResult<PaginatedResult<ApprovalLogEntry>> {
        self.approvals.list_by_milestone(milestone_id, pagination).await
    }

    /// Recompute the derived progress and lifecycle state from the
    /// current task statuses, persist them, and fan out a notification
    /// when the milestone newly becomes ready for approval.
    ///
    /// Runs inside every task-mutating operation so `progress` is never
    /// stale when read immediately after a task update.
    async fn recompute(&self, before: &Milestone) -> EventraResult<Milestone> {
        let tasks = self.tasks.list_by_milestone(before.id).await?;
        let statuses: Vec<TaskStatus> = tasks.iter().map(|t| t.status).collect();
        let status =
            progress::effective_status(before.status, progress::derive_status(&statuses));

        let updated = self
            .milestones
            .update(
                before.id,
                UpdateMilestone {
                    progress: Some(progress::milestone_progress(&statuses)),
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;

        if status == MilestoneStatus::ReadyForApproval
            && before.status != MilestoneStatus::ReadyForApproval
        {
            self.notify(&updated, &tasks, WorkflowEventKind::ReadyForApproval, None)
                .await;
        }
        Ok(updated)
    }

    async fn review(
        &self,
        milestone_id: Uuid,
        reviewer: &Identity,
        action: ApprovalAction,
        comment: Option<String>,
    ) -> EventraResult<Milestone> {
        let milestone = self.milestones.get_by_id(milestone_id).await?;

        if !can_review(reviewer, &milestone) {
            return Err(WorkflowError::NotAReviewer.into());
        }
        // Precondition check before any mutation: a failed review leaves
        // the milestone untouched.
        if milestone.status != MilestoneStatus::ReadyForApproval {
            return Err(WorkflowError::InvalidTransition {
                from: milestone.status,
                attempted: verb(action),
            }
            .into());
        }

        let tasks = self.tasks.list_by_milestone(milestone_id).await?;
        let (new_status, kind) = match action {
            ApprovalAction::Approved => (MilestoneStatus::Approved, WorkflowEventKind::Approved),
            ApprovalAction::ChangesRequested => (
                MilestoneStatus::ChangesRequested,
                WorkflowEventKind::ChangesRequested,
            ),
        };

        let (affected, looped_status): (fn(TaskStatus) -> bool, TaskStatus) = match action {
            // Completed tasks are promoted with the milestone.
            ApprovalAction::Approved => (
                |s| s == TaskStatus::Completed,
                TaskStatus::Approved,
            ),
            // All finished work loops back for revision.
            ApprovalAction::ChangesRequested => (
                |s: TaskStatus| s.counts_as_done(),
                TaskStatus::InProgress,
            ),
        };
        for task in tasks.iter().filter(|t| affected(t.status)) {
            self.tasks
                .update(
                    milestone_id,
                    task.id,
                    UpdateTask {
                        status: Some(looped_status),
                        ..Default::default()
                    },
                )
                .await?;
        }

        let tasks = self.tasks.list_by_milestone(milestone_id).await?;
        let statuses: Vec<TaskStatus> = tasks.iter().map(|t| t.status).collect();
        let updated = self
            .milestones
            .update(
                milestone_id,
                UpdateMilestone {
                    progress: Some(progress::milestone_progress(&statuses)),
                    status: Some(new_status),
                    ..Default::default()
                },
            )
            .await?;

        self.approvals
            .append(CreateApprovalLogEntry {
                milestone_id,
                actor_id: reviewer.user_id,
                action,
                comment: comment.clone(),
                metadata: Some(serde_json::json!({ "progress": updated.progress })),
            })
            .await?;

        self.notify(&updated, &tasks, kind, comment).await;
        Ok(updated)
    }

    /// Best-effort fan-out. Failure is logged, never propagated: the
    /// transition it announces has already been persisted.
    async fn notify(
        &self,
        milestone: &Milestone,
        tasks: &[Task],
        kind: WorkflowEventKind,
        comment: Option<String>,
    ) {
        let mut recipients: BTreeSet<Uuid> = tasks.iter().filter_map(|t| t.assignee_id).collect();
        if let Some(owner) = milestone.owner_id {
            recipients.insert(owner);
        }
        if recipients.is_empty() {
            return;
        }
        let recipients: Vec<Uuid> = recipients.into_iter().collect();

        let event = WorkflowEvent {
            kind,
            milestone_id: milestone.id,
            milestone_name: milestone.name.clone(),
            project_id: milestone.project_id,
            comment,
        };
        if let Err(err) = self.dispatcher.dispatch(&recipients, &event).await {
            warn!(
                milestone_id = %milestone.id,
                kind = ?kind,
                error = %err,
                "notification dispatch failed"
            );
        }
    }
}

/// Admins and moderators review any milestone; the owning client may
/// review their own.
fn can_review(reviewer: &Identity, milestone: &Milestone) -> bool {
    match reviewer.role {
        Role::Admin | Role::Moderator => true,
        Role::Client => milestone.owner_id == Some(reviewer.user_id),
        Role::ContentCreator => false,
    }
}

fn verb(action: ApprovalAction) -> &'static str {
    match action {
        ApprovalAction::Approved => "approve",
        ApprovalAction::ChangesRequested => "request changes on",
    }
}

/// Dispatcher that persists one notification row per recipient.
pub struct PersistingDispatcher<N: NotificationRepository> {
    notifications: N,
}

impl<N: NotificationRepository> PersistingDispatcher<N> {
    pub fn new(notifications: N) -> Self {
        Self { notifications }
    }
}

impl<N: NotificationRepository> NotificationDispatcher for PersistingDispatcher<N> {
    async fn dispatch(&self, recipients: &[Uuid], event: &WorkflowEvent) -> EventraResult<()> {
        for recipient in recipients {
            self.notifications
                .create(CreateNotification {
                    recipient_user_id: *recipient,
                    kind: event.kind.as_str().to_string(),
                    title: title_for(event.kind).to_string(),
                    message: message_for(event),
                    related_project_id: Some(event.project_id),
                })
                .await?;
        }
        Ok(())
    }
}

fn title_for(kind: WorkflowEventKind) -> &'static str {
    match kind {
        WorkflowEventKind::ReadyForApproval => "Milestone ready for approval",
        WorkflowEventKind::Approved => "Milestone approved",
        WorkflowEventKind::ChangesRequested => "Changes requested",
    }
}

fn message_for(event: &WorkflowEvent) -> String {
    let base = match event.kind {
        WorkflowEventKind::ReadyForApproval => format!(
            "All tasks in \"{}\" are completed and awaiting review.",
            event.milestone_name
        ),
        WorkflowEventKind::Approved => {
            format!("\"{}\" has been approved.", event.milestone_name)
        }
        WorkflowEventKind::ChangesRequested => {
            format!("Changes were requested on \"{}\".", event.milestone_name)
        }
    };
    match &event.comment {
        Some(comment) => format!("{base} Comment: {comment}"),
        None => base,
    }
}
