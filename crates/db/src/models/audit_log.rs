//! Audit log entity: constraint enforcement and lifecycle events.

use serde::Serialize;
use sqlx::FromRow;

use fondant_core::types::{DbId, Timestamp};

/// A row from the `audit_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub request_id: Option<DbId>,
    pub action_type: String,
    pub log_category: String,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for writing one audit entry. The category is derived from the action
/// type by the repository.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub request_id: Option<DbId>,
    pub action_type: String,
    pub details: serde_json::Value,
}
