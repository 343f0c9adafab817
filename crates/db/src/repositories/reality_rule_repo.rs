//! Repository for the `reality_rules` table.

use sqlx::PgPool;

use crate::models::reality_rule::RealityRule;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, rule_text, sort_order, is_active, created_at";

/// Provides read access to the reality-rule lookup.
pub struct RealityRuleRepo;

impl RealityRuleRepo {
    /// List active rules in their configured order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<RealityRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reality_rules
             WHERE is_active = true
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, RealityRule>(&query)
            .fetch_all(pool)
            .await
    }
}
