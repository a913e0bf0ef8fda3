//! Integration tests for the SurrealDB repositories.

use eventra_core::models::approval::{ApprovalAction, CreateApprovalLogEntry};
use eventra_core::models::milestone::{CreateMilestone, MilestoneStatus, UpdateMilestone};
use eventra_core::models::notification::CreateNotification;
use eventra_core::models::task::{CreateTask, TaskStatus, UpdateTask};
use eventra_core::repository::{
    ApprovalLogRepository, MilestoneRepository, NotificationRepository, Pagination,
    TaskRepository,
};
use eventra_db::DbManager;
use eventra_db::repository::{
    SurrealApprovalLogRepository, SurrealMilestoneRepository, SurrealNotificationRepository,
    SurrealTaskRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

/// Spin up an in-memory DB with the schema applied.
async fn setup() -> Surreal<Db> {
    DbManager::in_memory().await.unwrap().client().clone()
}

fn milestone_input(project_id: Uuid) -> CreateMilestone {
    CreateMilestone {
        project_id,
        name: "Venue booking".into(),
        owner_id: None,
        due_date: None,
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    // setup() already migrated once through DbManager; a second run is
    // a no-op, not an error.
    let db = setup().await;
    eventra_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn milestone_create_defaults() {
    let db = setup().await;
    let repo = SurrealMilestoneRepository::new(db);

    let milestone = repo.create(milestone_input(Uuid::new_v4())).await.unwrap();
    assert_eq!(milestone.progress, 0);
    assert_eq!(milestone.status, MilestoneStatus::NoTasks);
    assert_eq!(milestone.name, "Venue booking");
    assert!(milestone.owner_id.is_none());
}

#[tokio::test]
async fn milestone_update_and_get() {
    let db = setup().await;
    let repo = SurrealMilestoneRepository::new(db);

    let created = repo.create(milestone_input(Uuid::new_v4())).await.unwrap();
    let owner = Uuid::new_v4();
    let updated = repo
        .update(
            created.id,
            UpdateMilestone {
                name: Some("Venue booking and setup".into()),
                owner_id: Some(Some(owner)),
                progress: Some(40),
                status: Some(MilestoneStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.progress, 40);
    assert_eq!(updated.status, MilestoneStatus::InProgress);
    assert_eq!(updated.owner_id, Some(owner));

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.name, "Venue booking and setup");
    assert_eq!(fetched.progress, 40);
}

#[tokio::test]
async fn milestone_get_missing_is_not_found() {
    let db = setup().await;
    let repo = SurrealMilestoneRepository::new(db);
    assert!(repo.get_by_id(Uuid::new_v4()).await.is_err());
}

#[tokio::test]
async fn milestone_list_by_project_is_scoped() {
    let db = setup().await;
    let repo = SurrealMilestoneRepository::new(db);

    let project_a = Uuid::new_v4();
    let project_b = Uuid::new_v4();
    repo.create(milestone_input(project_a)).await.unwrap();
    repo.create(milestone_input(project_a)).await.unwrap();
    repo.create(milestone_input(project_b)).await.unwrap();

    let page = repo
        .list_by_project(project_a, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|m| m.project_id == project_a));
}

#[tokio::test]
async fn milestone_delete_cascades_to_tasks() {
    let db = setup().await;
    let milestones = SurrealMilestoneRepository::new(db.clone());
    let tasks = SurrealTaskRepository::new(db);

    let milestone = milestones
        .create(milestone_input(Uuid::new_v4()))
        .await
        .unwrap();
    tasks
        .create(CreateTask {
            milestone_id: milestone.id,
            title: "Book caterer".into(),
            assignee_id: None,
        })
        .await
        .unwrap();

    milestones.delete(milestone.id).await.unwrap();

    assert!(milestones.get_by_id(milestone.id).await.is_err());
    let remaining = tasks.list_by_milestone(milestone.id).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn task_create_update_and_list() {
    let db = setup().await;
    let repo = SurrealTaskRepository::new(db);

    let milestone_id = Uuid::new_v4();
    let assignee = Uuid::new_v4();
    let task = repo
        .create(CreateTask {
            milestone_id,
            title: "Send invitations".into(),
            assignee_id: Some(assignee),
        })
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.assignee_id, Some(assignee));

    let updated = repo
        .update(
            milestone_id,
            task.id,
            UpdateTask {
                status: Some(TaskStatus::Completed),
                assignee_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.assignee_id, None);

    let listed = repo.list_by_milestone(milestone_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, task.id);
}

#[tokio::test]
async fn task_update_is_scoped_to_milestone() {
    let db = setup().await;
    let repo = SurrealTaskRepository::new(db);

    let milestone_id = Uuid::new_v4();
    let task = repo
        .create(CreateTask {
            milestone_id,
            title: "Stage design".into(),
            assignee_id: None,
        })
        .await
        .unwrap();

    // Wrong milestone id matches no row.
    let result = repo
        .update(
            Uuid::new_v4(),
            task.id,
            UpdateTask {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());

    let unchanged = repo.get_by_id(milestone_id, task.id).await.unwrap();
    assert_eq!(unchanged.status, TaskStatus::Pending);
}

#[tokio::test]
async fn notification_mark_read_is_recipient_scoped() {
    let db = setup().await;
    let repo = SurrealNotificationRepository::new(db);

    let recipient = Uuid::new_v4();
    let notification = repo
        .create(CreateNotification {
            recipient_user_id: recipient,
            kind: "Approved".into(),
            title: "Milestone approved".into(),
            message: "\"Venue booking\" has been approved.".into(),
            related_project_id: None,
        })
        .await
        .unwrap();
    assert!(!notification.read);
    assert_eq!(repo.count_unread(recipient).await.unwrap(), 1);

    // Another user cannot mark it read.
    assert!(repo.mark_read(Uuid::new_v4(), notification.id).await.is_err());
    assert_eq!(repo.count_unread(recipient).await.unwrap(), 1);

    let read = repo.mark_read(recipient, notification.id).await.unwrap();
    assert!(read.read);
    assert_eq!(repo.count_unread(recipient).await.unwrap(), 0);

    let page = repo
        .list_by_recipient(recipient, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert!(page.items[0].read);
}

#[tokio::test]
async fn approval_log_appends_in_order() {
    let db = setup().await;
    let repo = SurrealApprovalLogRepository::new(db);

    let milestone_id = Uuid::new_v4();
    let reviewer = Uuid::new_v4();

    repo.append(CreateApprovalLogEntry {
        milestone_id,
        actor_id: reviewer,
        action: ApprovalAction::ChangesRequested,
        comment: Some("Missing seating chart".into()),
        metadata: None,
    })
    .await
    .unwrap();
    repo.append(CreateApprovalLogEntry {
        milestone_id,
        actor_id: reviewer,
        action: ApprovalAction::Approved,
        comment: None,
        metadata: Some(serde_json::json!({ "progress": 100 })),
    })
    .await
    .unwrap();

    let page = repo
        .list_by_milestone(milestone_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].action, ApprovalAction::ChangesRequested);
    assert_eq!(page.items[0].comment.as_deref(), Some("Missing seating chart"));
    assert_eq!(page.items[1].action, ApprovalAction::Approved);
}
