//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Milestones
-- =======================================================================
DEFINE TABLE milestone SCHEMAFULL;
DEFINE FIELD project_id ON TABLE milestone TYPE string;
DEFINE FIELD name ON TABLE milestone TYPE string;
DEFINE FIELD owner_id ON TABLE milestone TYPE option<string>;
DEFINE FIELD progress ON TABLE milestone TYPE int \
    ASSERT $value >= 0 AND $value <= 100;
DEFINE FIELD status ON TABLE milestone TYPE string \
    ASSERT $value IN ['NoTasks', 'InProgress', 'ReadyForApproval', \
    'Approved', 'ChangesRequested'];
DEFINE FIELD due_date ON TABLE milestone TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE milestone TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE milestone TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_milestone_project ON TABLE milestone \
    COLUMNS project_id;

-- =======================================================================
-- Tasks (scoped to milestone)
-- =======================================================================
DEFINE TABLE task SCHEMAFULL;
DEFINE FIELD milestone_id ON TABLE task TYPE string;
DEFINE FIELD title ON TABLE task TYPE string;
DEFINE FIELD status ON TABLE task TYPE string \
    ASSERT $value IN ['Pending', 'InProgress', 'Completed', 'Approved', \
    'Rejected'];
DEFINE FIELD assignee_id ON TABLE task TYPE option<string>;
DEFINE FIELD created_at ON TABLE task TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE task TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_task_milestone ON TABLE task COLUMNS milestone_id;

-- =======================================================================
-- Notifications
-- =======================================================================
DEFINE TABLE notification SCHEMAFULL;
DEFINE FIELD recipient_user_id ON TABLE notification TYPE string;
DEFINE FIELD kind ON TABLE notification TYPE string;
DEFINE FIELD title ON TABLE notification TYPE string;
DEFINE FIELD message ON TABLE notification TYPE string;
DEFINE FIELD read ON TABLE notification TYPE bool DEFAULT false;
DEFINE FIELD related_project_id ON TABLE notification \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE notification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_notification_recipient ON TABLE notification \
    COLUMNS recipient_user_id;

-- =======================================================================
-- Approval log (append-only)
-- =======================================================================
DEFINE TABLE approval_log SCHEMAFULL;
DEFINE FIELD milestone_id ON TABLE approval_log TYPE string;
DEFINE FIELD actor_id ON TABLE approval_log TYPE string;
DEFINE FIELD action ON TABLE approval_log TYPE string \
    ASSERT $value IN ['Approved', 'ChangesRequested'];
DEFINE FIELD comment ON TABLE approval_log TYPE option<string>;
DEFINE FIELD metadata ON TABLE approval_log TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD timestamp ON TABLE approval_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_approval_milestone ON TABLE approval_log \
    COLUMNS milestone_id;
";

/// Apply all pending migrations, in version order.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}
