//! SurrealDB implementation of [`NotificationRepository`].

use chrono::{DateTime, Utc};
use eventra_core::error::EventraResult;
use eventra_core::models::notification::{CreateNotification, Notification};
use eventra_core::repository::{NotificationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct NotificationRow {
    recipient_user_id: String,
    kind: String,
    title: String,
    message: String,
    read: bool,
    related_project_id: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct NotificationRowWithId {
    record_id: String,
    recipient_user_id: String,
    kind: String,
    title: String,
    message: String,
    read: bool,
    related_project_id: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn row_to_notification(row: NotificationRow, id: Uuid) -> Result<Notification, DbError> {
    let recipient_user_id = parse_uuid("recipient", &row.recipient_user_id)?;
    let related_project_id = row
        .related_project_id
        .as_deref()
        .map(|p| parse_uuid("project", p))
        .transpose()?;
    Ok(Notification {
        id,
        recipient_user_id,
        kind: row.kind,
        title: row.title,
        message: row.message,
        read: row.read,
        related_project_id,
        created_at: row.created_at,
    })
}

impl NotificationRowWithId {
    fn try_into_notification(self) -> Result<Notification, DbError> {
        let id = parse_uuid("notification", &self.record_id)?;
        row_to_notification(
            NotificationRow {
                recipient_user_id: self.recipient_user_id,
                kind: self.kind,
                title: self.title,
                message: self.message,
                read: self.read,
                related_project_id: self.related_project_id,
                created_at: self.created_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Notification repository.
#[derive(Clone)]
pub struct SurrealNotificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNotificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NotificationRepository for SurrealNotificationRepository<C> {
    async fn create(&self, input: CreateNotification) -> EventraResult<Notification> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('notification', $id) SET \
                 recipient_user_id = $recipient_user_id, \
                 kind = $kind, \
                 title = $title, \
                 message = $message, \
                 read = false, \
                 related_project_id = $related_project_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("recipient_user_id", input.recipient_user_id.to_string()))
            .bind(("kind", input.kind))
            .bind(("title", input.title))
            .bind(("message", input.message))
            .bind((
                "related_project_id",
                input.related_project_id.map(|p| p.to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;

        Ok(row_to_notification(row, id)?)
    }

    async fn list_by_recipient(
        &self,
        recipient_user_id: Uuid,
        pagination: Pagination,
    ) -> EventraResult<PaginatedResult<Notification>> {
        let recipient_str = recipient_user_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM notification \
                 WHERE recipient_user_id = $recipient GROUP ALL",
            )
            .bind(("recipient", recipient_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM notification \
                 WHERE recipient_user_id = $recipient \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("recipient", recipient_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_notification())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn mark_read(&self, recipient_user_id: Uuid, id: Uuid) -> EventraResult<Notification> {
        let id_str = id.to_string();

        // Scoped to the recipient: anyone else's id matches no row.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('notification', $id) SET read = true \
                 WHERE recipient_user_id = $recipient",
            )
            .bind(("id", id_str.clone()))
            .bind(("recipient", recipient_user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;

        Ok(row_to_notification(row, id)?)
    }

    async fn count_unread(&self, recipient_user_id: Uuid) -> EventraResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM notification \
                 WHERE recipient_user_id = $recipient AND read = false \
                 GROUP ALL",
            )
            .bind(("recipient", recipient_user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
