//! Repository for the `proposals` table.

use sqlx::PgPool;

use fondant_core::status::RequestStatus;
use fondant_core::types::DbId;

use crate::models::proposal::{CreateProposal, Proposal};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, request_id, variant_id, image_key, prompt, negative_prompt, \
    seed, stage, scores, rank_score, price_min_cents, price_max_cents, badges, is_selected, \
    created_at, updated_at";

/// Result of an exclusive-selection attempt.
#[derive(Debug)]
pub enum SelectOutcome {
    /// The proposal is now the single selected one for its request.
    Selected(Proposal),
    /// The request or the proposal does not exist (or they do not match).
    NotFound,
    /// The request is not in a selectable status; carries the current
    /// status ID.
    WrongStatus(i16),
}

/// Provides CRUD operations for proposals.
pub struct ProposalRepo;

impl ProposalRepo {
    /// Insert a batch of proposals atomically, returning the created rows
    /// in input order. An empty batch is a no-op.
    pub async fn create_batch(
        pool: &PgPool,
        inputs: &[CreateProposal],
    ) -> Result<Vec<Proposal>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO proposals
                (request_id, variant_id, image_key, prompt, negative_prompt,
                 seed, stage, scores, rank_score, price_min_cents, price_max_cents, badges)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let proposal = sqlx::query_as::<_, Proposal>(&query)
                .bind(input.request_id)
                .bind(input.variant_id)
                .bind(&input.image_key)
                .bind(&input.prompt)
                .bind(&input.negative_prompt)
                .bind(input.seed)
                .bind(input.stage)
                .bind(&input.scores)
                .bind(input.rank_score)
                .bind(input.price_min_cents)
                .bind(input.price_max_cents)
                .bind(&input.badges)
                .fetch_one(&mut *tx)
                .await?;
            created.push(proposal);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Find a proposal by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List proposals for a request, best rank first.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals
             WHERE request_id = $1
             ORDER BY rank_score DESC, id ASC"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }

    /// Whether any proposals exist for a request.
    pub async fn exists_for_request(pool: &PgPool, request_id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM proposals WHERE request_id = $1)")
                .bind(request_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Mark one proposal as the request's selection, un-marking any other.
    /// Uses a transaction with a row lock on the request to ensure atomicity.
    ///
    /// Selection is allowed while the request is Ready (first pick) or
    /// Selected (changing the pick); a Ready request is moved to Selected.
    pub async fn select_exclusive(
        pool: &PgPool,
        request_id: DbId,
        proposal_id: DbId,
    ) -> Result<SelectOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Lock the request row so concurrent selections serialize.
        let status: Option<(i16,)> =
            sqlx::query_as("SELECT status_id FROM requests WHERE id = $1 FOR UPDATE")
                .bind(request_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((status_id,)) = status else {
            return Ok(SelectOutcome::NotFound);
        };
        if status_id != RequestStatus::Ready.id() && status_id != RequestStatus::Selected.id() {
            return Ok(SelectOutcome::WrongStatus(status_id));
        }

        // Unmark current selection (if any)
        sqlx::query(
            "UPDATE proposals SET is_selected = false, updated_at = NOW()
             WHERE request_id = $1 AND is_selected = true",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        // Mark the specified proposal
        let query = format!(
            "UPDATE proposals SET is_selected = true, updated_at = NOW()
             WHERE id = $1 AND request_id = $2
             RETURNING {COLUMNS}"
        );
        let selected = sqlx::query_as::<_, Proposal>(&query)
            .bind(proposal_id)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(proposal) = selected else {
            // Roll back the unmark above by dropping the transaction.
            return Ok(SelectOutcome::NotFound);
        };

        if status_id == RequestStatus::Ready.id() {
            sqlx::query("UPDATE requests SET status_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(request_id)
                .bind(RequestStatus::Selected.id())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(SelectOutcome::Selected(proposal))
    }
}
