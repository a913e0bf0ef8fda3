//! SurrealDB implementation of [`TaskRepository`].

use chrono::{DateTime, Utc};
use eventra_core::error::EventraResult;
use eventra_core::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use eventra_core::repository::TaskRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct TaskRow {
    milestone_id: String,
    title: String,
    status: String,
    assignee_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TaskRowWithId {
    record_id: String,
    milestone_id: String,
    title: String,
    status: String,
    assignee_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<TaskStatus, DbError> {
    match s {
        "Pending" => Ok(TaskStatus::Pending),
        "InProgress" => Ok(TaskStatus::InProgress),
        "Completed" => Ok(TaskStatus::Completed),
        "Approved" => Ok(TaskStatus::Approved),
        "Rejected" => Ok(TaskStatus::Rejected),
        other => Err(DbError::Decode(format!("unknown task status: {other}"))),
    }
}

fn row_to_task(row: TaskRow, id: Uuid) -> Result<Task, DbError> {
    let milestone_id = parse_uuid("milestone", &row.milestone_id)?;
    let assignee_id = row
        .assignee_id
        .as_deref()
        .map(|a| parse_uuid("assignee", a))
        .transpose()?;
    Ok(Task {
        id,
        milestone_id,
        title: row.title,
        status: parse_status(&row.status)?,
        assignee_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl TaskRowWithId {
    fn try_into_task(self) -> Result<Task, DbError> {
        let id = parse_uuid("task", &self.record_id)?;
        row_to_task(
            TaskRow {
                milestone_id: self.milestone_id,
                title: self.title,
                status: self.status,
                assignee_id: self.assignee_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Task repository.
#[derive(Clone)]
pub struct SurrealTaskRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTaskRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TaskRepository for SurrealTaskRepository<C> {
    async fn create(&self, input: CreateTask) -> EventraResult<Task> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('task', $id) SET \
                 milestone_id = $milestone_id, \
                 title = $title, \
                 status = 'Pending', \
                 assignee_id = $assignee_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("milestone_id", input.milestone_id.to_string()))
            .bind(("title", input.title))
            .bind(("assignee_id", input.assignee_id.map(|a| a.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row_to_task(row, id)?)
    }

    async fn get_by_id(&self, milestone_id: Uuid, id: Uuid) -> EventraResult<Task> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('task', $id) \
                 WHERE milestone_id = $milestone_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("milestone_id", milestone_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row_to_task(row, id)?)
    }

    async fn update(&self, milestone_id: Uuid, id: Uuid, input: UpdateTask) -> EventraResult<Task> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.assignee_id.is_some() {
            sets.push("assignee_id = $assignee_id");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('task', $id) SET {} \
             WHERE milestone_id = $milestone_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("milestone_id", milestone_id.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(assignee_id) = input.assignee_id {
            // Option<Option<Uuid>>: Some(Some(v)) = assign, Some(None) = unassign.
            builder = builder.bind(("assignee_id", assignee_id.map(|a| a.to_string())));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row_to_task(row, id)?)
    }

    async fn delete(&self, milestone_id: Uuid, id: Uuid) -> EventraResult<()> {
        self.db
            .query(
                "DELETE type::record('task', $id) \
                 WHERE milestone_id = $milestone_id",
            )
            .bind(("id", id.to_string()))
            .bind(("milestone_id", milestone_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_milestone(&self, milestone_id: Uuid) -> EventraResult<Vec<Task>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task \
                 WHERE milestone_id = $milestone_id \
                 ORDER BY created_at ASC",
            )
            .bind(("milestone_id", milestone_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRowWithId> = result.take(0).map_err(DbError::from)?;

        let tasks = rows
            .into_iter()
            .map(|row| row.try_into_task())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(tasks)
    }
}
