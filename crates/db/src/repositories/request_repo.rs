//! Repository for the `requests` table.

use sqlx::PgPool;
use uuid::Uuid;

use fondant_core::types::DbId;

use crate::models::request::{CreateRequest, Request};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, style_pack_id, size_category_id, brief, customer_name, \
    customer_email, status_id, access_token, created_at, updated_at";

/// Provides CRUD operations for generation requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a new request in status 1 (Generating), returning the created
    /// row.
    ///
    /// The insert only fires when both the referenced style pack and size
    /// category exist and are active; otherwise returns `None` without
    /// touching the table.
    pub async fn create(pool: &PgPool, input: &CreateRequest) -> Result<Option<Request>, sqlx::Error> {
        let query = format!(
            "INSERT INTO requests
                (style_pack_id, size_category_id, brief, customer_name, customer_email, access_token)
             SELECT $1, $2, $3, $4, $5, $6
             WHERE EXISTS (SELECT 1 FROM style_packs WHERE id = $1 AND is_active = true)
               AND EXISTS (SELECT 1 FROM size_categories WHERE id = $2 AND is_active = true)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(input.style_pack_id)
            .bind(input.size_category_id)
            .bind(&input.brief)
            .bind(&input.customer_name)
            .bind(&input.customer_email)
            .bind(Uuid::new_v4())
            .fetch_optional(pool)
            .await
    }

    /// Find a request by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Request>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1");
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a request by its customer-facing access token.
    pub async fn find_by_access_token(
        pool: &PgPool,
        access_token: Uuid,
    ) -> Result<Option<Request>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE access_token = $1");
        sqlx::query_as::<_, Request>(&query)
            .bind(access_token)
            .fetch_optional(pool)
            .await
    }

    /// Move a request from one status to another with a compare-and-set on
    /// the current status.
    ///
    /// Returns `None` when the request does not exist or is no longer in
    /// `from`, so concurrent transitions lose cleanly instead of clobbering.
    /// Legal pairs are defined by `fondant_core::status::state_machine`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: i16,
        to: i16,
    ) -> Result<Option<Request>, sqlx::Error> {
        let query = format!(
            "UPDATE requests SET status_id = $3, updated_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// List recent requests, newest first, capped at `limit`.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Request>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests
             ORDER BY created_at DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
