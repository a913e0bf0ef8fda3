//! SurrealDB implementation of [`MilestoneRepository`].

use chrono::{DateTime, Utc};
use eventra_core::error::EventraResult;
use eventra_core::models::milestone::{
    CreateMilestone, Milestone, MilestoneStatus, UpdateMilestone,
};
use eventra_core::repository::{MilestoneRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct MilestoneRow {
    project_id: String,
    name: String,
    owner_id: Option<String>,
    progress: i64,
    status: String,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct MilestoneRowWithId {
    record_id: String,
    project_id: String,
    name: String,
    owner_id: Option<String>,
    progress: i64,
    status: String,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_status(s: &str) -> Result<MilestoneStatus, DbError> {
    match s {
        "NoTasks" => Ok(MilestoneStatus::NoTasks),
        "InProgress" => Ok(MilestoneStatus::InProgress),
        "ReadyForApproval" => Ok(MilestoneStatus::ReadyForApproval),
        "Approved" => Ok(MilestoneStatus::Approved),
        "ChangesRequested" => Ok(MilestoneStatus::ChangesRequested),
        other => Err(DbError::Decode(format!("unknown milestone status: {other}"))),
    }
}

fn row_to_milestone(row: MilestoneRow, id: Uuid) -> Result<Milestone, DbError> {
    let project_id = parse_uuid("project", &row.project_id)?;
    let owner_id = row
        .owner_id
        .as_deref()
        .map(|o| parse_uuid("owner", o))
        .transpose()?;
    let progress = u8::try_from(row.progress)
        .map_err(|_| DbError::Decode(format!("progress out of range: {}", row.progress)))?;
    Ok(Milestone {
        id,
        project_id,
        name: row.name,
        owner_id,
        progress,
        status: parse_status(&row.status)?,
        due_date: row.due_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl MilestoneRowWithId {
    fn try_into_milestone(self) -> Result<Milestone, DbError> {
        let id = parse_uuid("milestone", &self.record_id)?;
        row_to_milestone(
            MilestoneRow {
                project_id: self.project_id,
                name: self.name,
                owner_id: self.owner_id,
                progress: self.progress,
                status: self.status,
                due_date: self.due_date,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Milestone repository.
#[derive(Clone)]
pub struct SurrealMilestoneRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMilestoneRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MilestoneRepository for SurrealMilestoneRepository<C> {
    async fn create(&self, input: CreateMilestone) -> EventraResult<Milestone> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('milestone', $id) SET \
                 project_id = $project_id, \
                 name = $name, \
                 owner_id = $owner_id, \
                 progress = 0, \
                 status = 'NoTasks', \
                 due_date = $due_date",
            )
            .bind(("id", id_str.clone()))
            .bind(("project_id", input.project_id.to_string()))
            .bind(("name", input.name))
            .bind(("owner_id", input.owner_id.map(|o| o.to_string())))
            .bind(("due_date", input.due_date))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<MilestoneRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "milestone".into(),
            id: id_str,
        })?;

        Ok(row_to_milestone(row, id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> EventraResult<Milestone> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('milestone', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MilestoneRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "milestone".into(),
            id: id_str,
        })?;

        Ok(row_to_milestone(row, id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateMilestone) -> EventraResult<Milestone> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.owner_id.is_some() {
            sets.push("owner_id = $owner_id");
        }
        if input.progress.is_some() {
            sets.push("progress = $progress");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.due_date.is_some() {
            sets.push("due_date = $due_date");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('milestone', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(owner_id) = input.owner_id {
            // Option<Option<Uuid>>: Some(Some(v)) = set, Some(None) = clear.
            builder = builder.bind(("owner_id", owner_id.map(|o| o.to_string())));
        }
        if let Some(progress) = input.progress {
            builder = builder.bind(("progress", i64::from(progress)));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(due_date) = input.due_date {
            builder = builder.bind(("due_date", due_date));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<MilestoneRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "milestone".into(),
            id: id_str,
        })?;

        Ok(row_to_milestone(row, id)?)
    }

    async fn delete(&self, id: Uuid) -> EventraResult<()> {
        let id_str = id.to_string();

        // Cascade: the tasks belong to the milestone.
        self.db
            .query(
                "DELETE type::record('milestone', $id); \
                 DELETE task WHERE milestone_id = $id",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_project(
        &self,
        project_id: Uuid,
        pagination: Pagination,
    ) -> EventraResult<PaginatedResult<Milestone>> {
        let project_id_str = project_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM milestone \
                 WHERE project_id = $project_id GROUP ALL",
            )
            .bind(("project_id", project_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM milestone \
                 WHERE project_id = $project_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("project_id", project_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MilestoneRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_milestone())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
