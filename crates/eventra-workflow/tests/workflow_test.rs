//! Integration tests for the milestone approval workflow.

use eventra_core::dispatch::{NotificationDispatcher, WorkflowEvent};
use eventra_core::error::{EventraError, EventraResult};
use eventra_core::models::approval::ApprovalAction;
use eventra_core::models::identity::{Identity, Role};
use eventra_core::models::milestone::{CreateMilestone, MilestoneStatus};
use eventra_core::models::task::{CreateTask, TaskStatus};
use eventra_core::repository::{NotificationRepository, Pagination};
use eventra_db::DbManager;
use eventra_db::repository::{
    SurrealApprovalLogRepository, SurrealMilestoneRepository, SurrealNotificationRepository,
    SurrealTaskRepository,
};
use eventra_workflow::{MilestoneService, PersistingDispatcher};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

type Service = MilestoneService<
    SurrealMilestoneRepository<Db>,
    SurrealTaskRepository<Db>,
    SurrealApprovalLogRepository<Db>,
    PersistingDispatcher<SurrealNotificationRepository<Db>>,
>;

/// Spin up an in-memory DB with the schema applied and wire the service.
async fn setup() -> (Service, Surreal<Db>) {
    let db = DbManager::in_memory().await.unwrap().client().clone();

    let service = MilestoneService::new(
        SurrealMilestoneRepository::new(db.clone()),
        SurrealTaskRepository::new(db.clone()),
        SurrealApprovalLogRepository::new(db.clone()),
        PersistingDispatcher::new(SurrealNotificationRepository::new(db.clone())),
    );
    (service, db)
}

fn staff(role: Role) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        role,
    }
}

/// Create a milestone with `titles.len()` tasks, all assigned to `assignee`.
async fn milestone_with_tasks(
    service: &Service,
    owner_id: Option<Uuid>,
    assignee: Option<Uuid>,
    titles: &[&str],
) -> (Uuid, Vec<Uuid>) {
    let milestone = service
        .create_milestone(CreateMilestone {
            project_id: Uuid::new_v4(),
            name: "Opening ceremony".into(),
            owner_id,
            due_date: None,
        })
        .await
        .unwrap();

    let mut task_ids = Vec::new();
    for title in titles {
        let task = service
            .add_task(CreateTask {
                milestone_id: milestone.id,
                title: (*title).into(),
                assignee_id: assignee,
            })
            .await
            .unwrap();
        task_ids.push(task.id);
    }
    (milestone.id, task_ids)
}

#[tokio::test]
async fn empty_milestone_is_zero_progress_no_tasks() {
    let (service, _db) = setup().await;
    let (milestone_id, _) = milestone_with_tasks(&service, None, None, &[]).await;

    let milestone = service.get_milestone(milestone_id).await.unwrap();
    assert_eq!(milestone.progress, 0);
    assert_eq!(milestone.status, MilestoneStatus::NoTasks);
}

#[tokio::test]
async fn three_of_four_done_is_seventy_five_percent() {
    let (service, _db) = setup().await;
    let (milestone_id, tasks) =
        milestone_with_tasks(&service, None, None, &["a", "b", "c", "d"]).await;

    service
        .set_task_status(milestone_id, tasks[0], TaskStatus::Completed)
        .await
        .unwrap();
    service
        .set_task_status(milestone_id, tasks[1], TaskStatus::Completed)
        .await
        .unwrap();
    let milestone = service
        .set_task_status(milestone_id, tasks[2], TaskStatus::Approved)
        .await
        .unwrap();

    assert_eq!(milestone.progress, 75);
    assert_eq!(milestone.status, MilestoneStatus::InProgress);
}

#[tokio::test]
async fn progress_is_fresh_immediately_after_each_mutation() {
    let (service, _db) = setup().await;
    let (milestone_id, tasks) = milestone_with_tasks(&service, None, None, &["a", "b"]).await;

    let after_first = service
        .set_task_status(milestone_id, tasks[0], TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(after_first.progress, 50);

    let stored = service.get_milestone(milestone_id).await.unwrap();
    assert_eq!(stored.progress, 50);
}

#[tokio::test]
async fn refresh_is_idempotent() {
    let (service, _db) = setup().await;
    let (milestone_id, tasks) = milestone_with_tasks(&service, None, None, &["a", "b", "c"]).await;
    service
        .set_task_status(milestone_id, tasks[0], TaskStatus::Completed)
        .await
        .unwrap();

    let first = service.refresh(milestone_id).await.unwrap();
    let second = service.refresh(milestone_id).await.unwrap();
    assert_eq!(first.progress, second.progress);
    assert_eq!(first.status, second.status);
    assert_eq!(first.progress, 33);
}

#[tokio::test]
async fn completing_all_tasks_raises_ready_and_notifies() {
    let (service, db) = setup().await;
    let owner = Uuid::new_v4();
    let assignee = Uuid::new_v4();
    let (milestone_id, tasks) =
        milestone_with_tasks(&service, Some(owner), Some(assignee), &["a", "b"]).await;

    service
        .set_task_status(milestone_id, tasks[0], TaskStatus::Completed)
        .await
        .unwrap();
    let milestone = service
        .set_task_status(milestone_id, tasks[1], TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(milestone.progress, 100);
    assert_eq!(milestone.status, MilestoneStatus::ReadyForApproval);

    // Both the owner and the assignee are notified exactly once.
    let notifications = SurrealNotificationRepository::new(db);
    for recipient in [owner, assignee] {
        let page = notifications
            .list_by_recipient(recipient, Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1, "recipient {recipient}");
        assert_eq!(page.items[0].kind, "ReadyForApproval");
    }
}

#[tokio::test]
async fn approve_happy_path() {
    let (service, db) = setup().await;
    let owner = Uuid::new_v4();
    let (milestone_id, tasks) =
        milestone_with_tasks(&service, Some(owner), None, &["a", "b"]).await;
    for task in &tasks {
        service
            .set_task_status(milestone_id, *task, TaskStatus::Completed)
            .await
            .unwrap();
    }

    let reviewer = staff(Role::Moderator);
    let approved = service
        .approve(milestone_id, &reviewer, Some("Looks great".into()))
        .await
        .unwrap();
    assert_eq!(approved.status, MilestoneStatus::Approved);
    assert_eq!(approved.progress, 100);

    // Completed tasks were promoted with the milestone.
    for task in service.list_tasks(milestone_id).await.unwrap() {
        assert_eq!(task.status, TaskStatus::Approved);
    }

    // The approval is on the audit trail.
    let history = service
        .approval_history(milestone_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].action, ApprovalAction::Approved);
    assert_eq!(history.items[0].actor_id, reviewer.user_id);
    assert_eq!(history.items[0].comment.as_deref(), Some("Looks great"));

    // The owner got both the ready and the approved notifications.
    let notifications = SurrealNotificationRepository::new(db);
    let page = notifications
        .list_by_recipient(owner, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().any(|n| n.kind == "Approved"));
}

#[tokio::test]
async fn approve_rejects_milestone_not_ready() {
    let (service, _db) = setup().await;
    let (milestone_id, tasks) =
        milestone_with_tasks(&service, None, None, &["a", "b", "c", "d", "e"]).await;
    // 3 of 5 done: progress 60.
    for task in &tasks[..3] {
        service
            .set_task_status(milestone_id, *task, TaskStatus::Completed)
            .await
            .unwrap();
    }
    let before = service.get_milestone(milestone_id).await.unwrap();
    assert_eq!(before.progress, 60);

    let err = service
        .approve(milestone_id, &staff(Role::Admin), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EventraError::InvalidTransition { .. }));

    // State unchanged, nothing logged.
    let after = service.get_milestone(milestone_id).await.unwrap();
    assert_eq!(after.progress, 60);
    assert_eq!(after.status, MilestoneStatus::InProgress);
    let history = service
        .approval_history(milestone_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 0);
}

#[tokio::test]
async fn request_changes_loops_tasks_back() {
    let (service, _db) = setup().await;
    let (milestone_id, tasks) = milestone_with_tasks(&service, None, None, &["a", "b"]).await;
    for task in &tasks {
        service
            .set_task_status(milestone_id, *task, TaskStatus::Completed)
            .await
            .unwrap();
    }

    let reviewer = staff(Role::Admin);
    let milestone = service
        .request_changes(milestone_id, &reviewer, Some("Redo the floor plan".into()))
        .await
        .unwrap();
    assert_eq!(milestone.status, MilestoneStatus::ChangesRequested);
    assert_eq!(milestone.progress, 0);

    for task in service.list_tasks(milestone_id).await.unwrap() {
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    let history = service
        .approval_history(milestone_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].action, ApprovalAction::ChangesRequested);
}

#[tokio::test]
async fn changes_requested_survives_refresh_until_ready_again() {
    let (service, _db) = setup().await;
    let (milestone_id, tasks) = milestone_with_tasks(&service, None, None, &["a", "b"]).await;
    for task in &tasks {
        service
            .set_task_status(milestone_id, *task, TaskStatus::Completed)
            .await
            .unwrap();
    }
    service
        .request_changes(milestone_id, &staff(Role::Moderator), None)
        .await
        .unwrap();

    let refreshed = service.refresh(milestone_id).await.unwrap();
    assert_eq!(refreshed.status, MilestoneStatus::ChangesRequested);

    // Completing everything again re-raises readiness.
    for task in &tasks {
        service
            .set_task_status(milestone_id, *task, TaskStatus::Completed)
            .await
            .unwrap();
    }
    let ready = service.get_milestone(milestone_id).await.unwrap();
    assert_eq!(ready.status, MilestoneStatus::ReadyForApproval);
}

#[tokio::test]
async fn content_creator_may_not_review() {
    let (service, _db) = setup().await;
    let (milestone_id, tasks) = milestone_with_tasks(&service, None, None, &["a"]).await;
    service
        .set_task_status(milestone_id, tasks[0], TaskStatus::Completed)
        .await
        .unwrap();

    let err = service
        .approve(milestone_id, &staff(Role::ContentCreator), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EventraError::Forbidden { .. }));
}

#[tokio::test]
async fn owning_client_may_approve_other_clients_may_not() {
    let (service, _db) = setup().await;
    let owner = Uuid::new_v4();
    let (milestone_id, tasks) = milestone_with_tasks(&service, Some(owner), None, &["a"]).await;
    service
        .set_task_status(milestone_id, tasks[0], TaskStatus::Completed)
        .await
        .unwrap();

    let stranger = Identity {
        user_id: Uuid::new_v4(),
        role: Role::Client,
    };
    let err = service.approve(milestone_id, &stranger, None).await.unwrap_err();
    assert!(matches!(err, EventraError::Forbidden { .. }));

    let owner_identity = Identity {
        user_id: owner,
        role: Role::Client,
    };
    let approved = service
        .approve(milestone_id, &owner_identity, None)
        .await
        .unwrap();
    assert_eq!(approved.status, MilestoneStatus::Approved);
}

/// Dispatcher whose delivery always fails.
struct FailingDispatcher;

impl NotificationDispatcher for FailingDispatcher {
    async fn dispatch(&self, _recipients: &[Uuid], _event: &WorkflowEvent) -> EventraResult<()> {
        Err(EventraError::Internal("relay unavailable".into()))
    }
}

#[tokio::test]
async fn dispatch_failure_never_rolls_back_the_transition() {
    let db = DbManager::in_memory().await.unwrap().client().clone();
    let service = MilestoneService::new(
        SurrealMilestoneRepository::new(db.clone()),
        SurrealTaskRepository::new(db.clone()),
        SurrealApprovalLogRepository::new(db.clone()),
        FailingDispatcher,
    );

    let owner = Uuid::new_v4();
    let milestone = service
        .create_milestone(CreateMilestone {
            project_id: Uuid::new_v4(),
            name: "Opening ceremony".into(),
            owner_id: Some(owner),
            due_date: None,
        })
        .await
        .unwrap();
    let task = service
        .add_task(CreateTask {
            milestone_id: milestone.id,
            title: "a".into(),
            assignee_id: Some(owner),
        })
        .await
        .unwrap();

    // Completion raises readiness even though the fan-out errors.
    let ready = service
        .set_task_status(milestone.id, task.id, TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(ready.status, MilestoneStatus::ReadyForApproval);

    let approved = service
        .approve(milestone.id, &staff(Role::Admin), None)
        .await
        .unwrap();
    assert_eq!(approved.status, MilestoneStatus::Approved);
    assert_eq!(approved.progress, 100);

    // The persisted state reflects the transition.
    let stored = service.get_milestone(milestone.id).await.unwrap();
    assert_eq!(stored.status, MilestoneStatus::Approved);
    assert_eq!(stored.progress, 100);
}

#[tokio::test]
async fn approved_milestone_reopens_on_task_rejection() {
    let (service, _db) = setup().await;
    let (milestone_id, tasks) = milestone_with_tasks(&service, None, None, &["a", "b"]).await;
    for task in &tasks {
        service
            .set_task_status(milestone_id, *task, TaskStatus::Completed)
            .await
            .unwrap();
    }
    service
        .approve(milestone_id, &staff(Role::Admin), None)
        .await
        .unwrap();

    // Approval survives a plain refresh.
    let refreshed = service.refresh(milestone_id).await.unwrap();
    assert_eq!(refreshed.status, MilestoneStatus::Approved);

    // A reopened task overrides the verdict.
    let reopened = service
        .set_task_status(milestone_id, tasks[0], TaskStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(reopened.status, MilestoneStatus::InProgress);
    assert_eq!(reopened.progress, 50);
}
