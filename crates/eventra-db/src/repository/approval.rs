//! SurrealDB implementation of [`ApprovalLogRepository`].
//!
//! Append-only: no update or delete statements exist here.

use chrono::{DateTime, Utc};
use eventra_core::error::EventraResult;
use eventra_core::models::approval::{ApprovalAction, ApprovalLogEntry, CreateApprovalLogEntry};
use eventra_core::repository::{ApprovalLogRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct ApprovalRow {
    milestone_id: String,
    actor_id: String,
    action: String,
    comment: Option<String>,
    metadata: serde_json::Value,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ApprovalRowWithId {
    record_id: String,
    milestone_id: String,
    actor_id: String,
    action: String,
    comment: Option<String>,
    metadata: serde_json::Value,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_action(s: &str) -> Result<ApprovalAction, DbError> {
    match s {
        "Approved" => Ok(ApprovalAction::Approved),
        "ChangesRequested" => Ok(ApprovalAction::ChangesRequested),
        other => Err(DbError::Decode(format!("unknown approval action: {other}"))),
    }
}

fn row_to_entry(row: ApprovalRow, id: Uuid) -> Result<ApprovalLogEntry, DbError> {
    Ok(ApprovalLogEntry {
        id,
        milestone_id: parse_uuid("milestone", &row.milestone_id)?,
        actor_id: parse_uuid("actor", &row.actor_id)?,
        action: parse_action(&row.action)?,
        comment: row.comment,
        metadata: row.metadata,
        timestamp: row.timestamp,
    })
}

impl ApprovalRowWithId {
    fn try_into_entry(self) -> Result<ApprovalLogEntry, DbError> {
        let id = parse_uuid("approval", &self.record_id)?;
        row_to_entry(
            ApprovalRow {
                milestone_id: self.milestone_id,
                actor_id: self.actor_id,
                action: self.action,
                comment: self.comment,
                metadata: self.metadata,
                timestamp: self.timestamp,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the approval log repository.
#[derive(Clone)]
pub struct SurrealApprovalLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealApprovalLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ApprovalLogRepository for SurrealApprovalLogRepository<C> {
    async fn append(&self, input: CreateApprovalLogEntry) -> EventraResult<ApprovalLogEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('approval_log', $id) SET \
                 milestone_id = $milestone_id, \
                 actor_id = $actor_id, \
                 action = $action, \
                 comment = $comment, \
                 metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("milestone_id", input.milestone_id.to_string()))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("action", input.action.as_str().to_string()))
            .bind(("comment", input.comment))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ApprovalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "approval_log".into(),
            id: id_str,
        })?;

        Ok(row_to_entry(row, id)?)
    }

    async fn list_by_milestone(
        &self,
        milestone_id: Uuid,
        pagination: Pagination,
    ) -> EventraResult<PaginatedResult<ApprovalLogEntry>> {
        let milestone_str = milestone_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM approval_log \
                 WHERE milestone_id = $milestone_id GROUP ALL",
            )
            .bind(("milestone_id", milestone_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM approval_log \
                 WHERE milestone_id = $milestone_id \
                 ORDER BY timestamp ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("milestone_id", milestone_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApprovalRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
