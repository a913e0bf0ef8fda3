//! SurrealDB repository implementations.

mod approval;
mod milestone;
mod notification;
mod task;

pub use approval::SurrealApprovalLogRepository;
pub use milestone::SurrealMilestoneRepository;
pub use notification::SurrealNotificationRepository;
pub use task::SurrealTaskRepository;

use uuid::Uuid;

use crate::error::DbError;

/// Parse a stored UUID string, naming the field on failure.
pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}
