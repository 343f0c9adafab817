//! Generation request entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use fondant_core::types::{DbId, Timestamp};

/// A row from the `requests` table.
///
/// `status_id` maps to `fondant_core::status::RequestStatus`; transitions go
/// through the repository so the state machine is enforced in one place.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Request {
    pub id: DbId,
    pub style_pack_id: DbId,
    pub size_category_id: DbId,
    pub brief: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub status_id: i16,
    pub access_token: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a generation request. Contact fields are required;
/// deserialization rejects payloads that omit them.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub style_pack_id: DbId,
    pub size_category_id: DbId,
    pub brief: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
}
