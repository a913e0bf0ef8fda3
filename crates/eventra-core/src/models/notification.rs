//! Notification domain model.
//!
//! Created by the workflow on milestone state transitions; mutated only
//! by the recipient (marking read), never by the workflow afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_user_id: Uuid,
    /// Event kind that produced this notification.
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub related_project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    pub recipient_user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub related_project_id: Option<Uuid>,
}
