//! Repository for the `audit_logs` table.

use sqlx::PgPool;

use fondant_core::audit::action_to_category;
use fondant_core::types::DbId;

use crate::models::audit_log::{AuditLog, CreateAuditLog};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, request_id, action_type, log_category, details, created_at";

/// Provides append and read access to the audit trail.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one audit entry, deriving its category from the action type.
    pub async fn create(pool: &PgPool, input: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs (request_id, action_type, log_category, details)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(input.request_id)
            .bind(&input.action_type)
            .bind(action_to_category(&input.action_type))
            .bind(&input.details)
            .fetch_one(pool)
            .await
    }

    /// Append a batch of entries atomically. An empty batch is a no-op.
    pub async fn create_batch(
        pool: &PgPool,
        inputs: &[CreateAuditLog],
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO audit_logs (request_id, action_type, log_category, details)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let entry = sqlx::query_as::<_, AuditLog>(&query)
                .bind(input.request_id)
                .bind(&input.action_type)
                .bind(action_to_category(&input.action_type))
                .bind(&input.details)
                .fetch_one(&mut *tx)
                .await?;
            created.push(entry);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// List entries for a request, oldest first.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE request_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }

    /// List entries in a category, newest first, capped at `limit`.
    pub async fn list_by_category(
        pool: &PgPool,
        log_category: &str,
        limit: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE log_category = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(log_category)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
