//! Integration tests for the request lifecycle: creation guards, status
//! transitions, proposal batches, exclusive selection, and the audit trail.

use sqlx::PgPool;

use fondant_core::audit::{action_types, log_categories};
use fondant_core::prompt::Variant;
use fondant_core::status::RequestStatus;
use fondant_core::style::StyleIntensity;
use fondant_db::models::audit_log::CreateAuditLog;
use fondant_db::models::proposal::CreateProposal;
use fondant_db::models::request::CreateRequest;
use fondant_db::models::size_category::CreateSizeCategory;
use fondant_db::models::style_pack::CreateStylePack;
use fondant_db::repositories::{
    AuditLogRepo, ProposalRepo, RequestRepo, SelectOutcome, SizeCategoryRepo, StylePackRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_style_pack(name: &str) -> CreateStylePack {
    CreateStylePack {
        name: name.to_string(),
        palette: serde_json::json!([{"hex": "#FFC0CB", "ratio": 1.0}]),
        allowed_decorations: vec![],
        banned_terms: vec![],
        palette_lock_strength: 0.5,
        intensity: StyleIntensity::default(),
        shape_template: None,
        trend_keywords: vec![],
        trend_techniques: vec![],
    }
}

fn new_size_category(name: &str) -> CreateSizeCategory {
    CreateSizeCategory {
        name: name.to_string(),
        tier_count: 2,
        serves_min: 20,
        serves_max: 40,
        price_min_cents: 12_000,
        price_max_cents: 30_000,
        default_shape: None,
    }
}

async fn seed_request(pool: &PgPool, tag: &str) -> fondant_db::models::request::Request {
    let pack = StylePackRepo::create(pool, &new_style_pack(&format!("Pack {tag}")))
        .await
        .unwrap();
    let category = SizeCategoryRepo::create(pool, &new_size_category(&format!("Size {tag}")))
        .await
        .unwrap();
    RequestRepo::create(
        pool,
        &CreateRequest {
            style_pack_id: pack.id,
            size_category_id: category.id,
            brief: Some("pink roses".to_string()),
            customer_name: "Test Customer".to_string(),
            customer_email: "customer@example.com".to_string(),
        },
    )
    .await
    .unwrap()
    .expect("Active pack and category should allow creation")
}

fn new_proposal(request_id: i64, variant: Variant, rank_score: f64) -> CreateProposal {
    CreateProposal {
        request_id,
        variant_id: variant.id(),
        image_key: format!("requests/{request_id}/{}.png", variant.label()),
        prompt: "a two tier cake".to_string(),
        negative_prompt: "blurry".to_string(),
        seed: 42,
        stage: 1,
        scores: serde_json::json!({
            "on_brief": 0.8, "palette_fit": 0.8, "bakeability": 0.9, "aesthetic": 0.7,
        }),
        rank_score,
        price_min_cents: 12_000,
        price_max_cents: 30_000,
        badges: vec![],
    }
}

// ---------------------------------------------------------------------------
// Test: Creation requires an active pack and an active category
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_requires_active_catalog_rows(pool: PgPool) {
    let pack = StylePackRepo::create(&pool, &new_style_pack("Guard"))
        .await
        .unwrap();
    let category = SizeCategoryRepo::create(&pool, &new_size_category("Guard"))
        .await
        .unwrap();

    let input = CreateRequest {
        style_pack_id: pack.id,
        size_category_id: category.id,
        brief: None,
        customer_name: "Dana".to_string(),
        customer_email: "dana@example.com".to_string(),
    };
    let request = RequestRepo::create(&pool, &input).await.unwrap();
    let request = request.expect("Both rows active: creation should succeed");
    assert_eq!(request.status_id, RequestStatus::Generating.id());

    StylePackRepo::deactivate(&pool, pack.id).await.unwrap();
    let rejected = RequestRepo::create(&pool, &input).await.unwrap();
    assert!(rejected.is_none(), "Inactive pack should block creation");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_recent_caps_and_orders(pool: PgPool) {
    let oldest = seed_request(&pool, "old").await;
    let middle = seed_request(&pool, "mid").await;
    let newest = seed_request(&pool, "new").await;

    // Spread the creation instants so the ordering is unambiguous.
    sqlx::query("UPDATE requests SET created_at = created_at - INTERVAL '2 hours' WHERE id = $1")
        .bind(oldest.id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE requests SET created_at = created_at - INTERVAL '1 hour' WHERE id = $1")
        .bind(middle.id)
        .execute(&pool)
        .await
        .unwrap();

    let recent = RequestRepo::list_recent(&pool, 2).await.unwrap();
    let ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_by_access_token(pool: PgPool) {
    let request = seed_request(&pool, "token").await;

    let found = RequestRepo::find_by_access_token(&pool, request.access_token)
        .await
        .unwrap()
        .expect("Token lookup should find the request");
    assert_eq!(found.id, request.id);

    let missing = RequestRepo::find_by_access_token(&pool, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Test: Status updates are compare-and-set
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_update_is_compare_and_set(pool: PgPool) {
    let request = seed_request(&pool, "cas").await;

    let updated = RequestRepo::update_status(
        &pool,
        request.id,
        RequestStatus::Generating.id(),
        RequestStatus::Ready.id(),
    )
    .await
    .unwrap()
    .expect("First transition should win");
    assert_eq!(updated.status_id, RequestStatus::Ready.id());

    // Same CAS again loses: the row is no longer Generating.
    let stale = RequestRepo::update_status(
        &pool,
        request.id,
        RequestStatus::Generating.id(),
        RequestStatus::Failed.id(),
    )
    .await
    .unwrap();
    assert!(stale.is_none(), "Stale CAS should not apply");
}

// ---------------------------------------------------------------------------
// Test: Proposal batches persist atomically, listed best-first
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_proposal_batch_and_ordering(pool: PgPool) {
    let request = seed_request(&pool, "batch").await;

    let batch = vec![
        new_proposal(request.id, Variant::Conservative, 0.61),
        new_proposal(request.id, Variant::Standard, 0.85),
        new_proposal(request.id, Variant::Bold, 0.74),
    ];
    let created = ProposalRepo::create_batch(&pool, &batch).await.unwrap();
    assert_eq!(created.len(), 3);

    let listed = ProposalRepo::list_for_request(&pool, request.id).await.unwrap();
    let ranks: Vec<f64> = listed.iter().map(|p| p.rank_score).collect();
    assert_eq!(ranks, vec![0.85, 0.74, 0.61]);

    assert!(ProposalRepo::exists_for_request(&pool, request.id).await.unwrap());
    assert!(!ProposalRepo::exists_for_request(&pool, 999_999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_proposal_batch_rolls_back_on_bad_row(pool: PgPool) {
    let request = seed_request(&pool, "rollback").await;

    let mut bad = new_proposal(request.id, Variant::Standard, 0.8);
    bad.variant_id = 99; // no such variant
    let batch = vec![new_proposal(request.id, Variant::Conservative, 0.6), bad];

    let result = ProposalRepo::create_batch(&pool, &batch).await;
    assert!(result.is_err());
    assert!(
        !ProposalRepo::exists_for_request(&pool, request.id).await.unwrap(),
        "Failed batch should leave no rows behind"
    );
}

// ---------------------------------------------------------------------------
// Test: Exclusive selection
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_selection_requires_ready_status(pool: PgPool) {
    let request = seed_request(&pool, "early").await;
    let created = ProposalRepo::create_batch(
        &pool,
        &[new_proposal(request.id, Variant::Standard, 0.8)],
    )
    .await
    .unwrap();

    // Still Generating: selection must be refused.
    let outcome = ProposalRepo::select_exclusive(&pool, request.id, created[0].id)
        .await
        .unwrap();
    match outcome {
        SelectOutcome::WrongStatus(status_id) => {
            assert_eq!(status_id, RequestStatus::Generating.id())
        }
        other => panic!("Expected WrongStatus, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_selection_is_exclusive_and_repeatable(pool: PgPool) {
    let request = seed_request(&pool, "select").await;
    let created = ProposalRepo::create_batch(
        &pool,
        &[
            new_proposal(request.id, Variant::Conservative, 0.6),
            new_proposal(request.id, Variant::Standard, 0.8),
        ],
    )
    .await
    .unwrap();
    RequestRepo::update_status(
        &pool,
        request.id,
        RequestStatus::Generating.id(),
        RequestStatus::Ready.id(),
    )
    .await
    .unwrap()
    .unwrap();

    // First pick moves the request to Selected.
    let outcome = ProposalRepo::select_exclusive(&pool, request.id, created[0].id)
        .await
        .unwrap();
    let SelectOutcome::Selected(first_pick) = outcome else {
        panic!("Expected Selected");
    };
    assert!(first_pick.is_selected);
    let request_now = RequestRepo::find_by_id(&pool, request.id).await.unwrap().unwrap();
    assert_eq!(request_now.status_id, RequestStatus::Selected.id());

    // Changing the pick unmarks the previous one.
    let outcome = ProposalRepo::select_exclusive(&pool, request.id, created[1].id)
        .await
        .unwrap();
    assert!(matches!(outcome, SelectOutcome::Selected(_)));

    let listed = ProposalRepo::list_for_request(&pool, request.id).await.unwrap();
    let selected: Vec<i64> = listed.iter().filter(|p| p.is_selected).map(|p| p.id).collect();
    assert_eq!(selected, vec![created[1].id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_selection_unknown_proposal_leaves_pick_intact(pool: PgPool) {
    let request = seed_request(&pool, "intact").await;
    let created = ProposalRepo::create_batch(
        &pool,
        &[new_proposal(request.id, Variant::Bold, 0.7)],
    )
    .await
    .unwrap();
    RequestRepo::update_status(
        &pool,
        request.id,
        RequestStatus::Generating.id(),
        RequestStatus::Ready.id(),
    )
    .await
    .unwrap()
    .unwrap();
    ProposalRepo::select_exclusive(&pool, request.id, created[0].id)
        .await
        .unwrap();

    let outcome = ProposalRepo::select_exclusive(&pool, request.id, 999_999)
        .await
        .unwrap();
    assert!(matches!(outcome, SelectOutcome::NotFound));

    // The failed attempt must not have unmarked the existing pick.
    let listed = ProposalRepo::list_for_request(&pool, request.id).await.unwrap();
    assert!(listed[0].is_selected);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_selection_unknown_request(pool: PgPool) {
    let outcome = ProposalRepo::select_exclusive(&pool, 999_999, 1).await.unwrap();
    assert!(matches!(outcome, SelectOutcome::NotFound));
}

// ---------------------------------------------------------------------------
// Test: Audit trail categories derive from action types
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audit_log_category_derivation(pool: PgPool) {
    let request = seed_request(&pool, "audit").await;

    let entry = AuditLogRepo::create(
        &pool,
        &CreateAuditLog {
            request_id: Some(request.id),
            action_type: action_types::FORBIDDEN_TERM_REPLACEMENT.to_string(),
            details: serde_json::json!({"original": "frozen", "replacement": "winter wonderland"}),
        },
    )
    .await
    .unwrap();
    assert_eq!(entry.log_category, log_categories::CONSTRAINT);

    let batch = AuditLogRepo::create_batch(
        &pool,
        &[
            CreateAuditLog {
                request_id: Some(request.id),
                action_type: action_types::GENERATION_STARTED.to_string(),
                details: serde_json::json!({}),
            },
            CreateAuditLog {
                request_id: Some(request.id),
                action_type: action_types::LOW_QUALITY_FLAGGED.to_string(),
                details: serde_json::json!({"overall": 0.31}),
            },
        ],
    )
    .await
    .unwrap();
    assert_eq!(batch[0].log_category, log_categories::LIFECYCLE);
    assert_eq!(batch[1].log_category, log_categories::QUALITY);

    let trail = AuditLogRepo::list_for_request(&pool, request.id).await.unwrap();
    assert_eq!(trail.len(), 3);

    let constraint_rows = AuditLogRepo::list_by_category(&pool, log_categories::CONSTRAINT, 10)
        .await
        .unwrap();
    assert_eq!(constraint_rows.len(), 1);
    assert_eq!(
        constraint_rows[0].action_type,
        action_types::FORBIDDEN_TERM_REPLACEMENT
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audit_log_survives_request_delete(pool: PgPool) {
    let request = seed_request(&pool, "orphan").await;
    AuditLogRepo::create(
        &pool,
        &CreateAuditLog {
            request_id: Some(request.id),
            action_type: action_types::GENERATION_STARTED.to_string(),
            details: serde_json::json!({}),
        },
    )
    .await
    .unwrap();

    sqlx::query("DELETE FROM requests WHERE id = $1")
        .bind(request.id)
        .execute(&pool)
        .await
        .unwrap();

    let rows: Vec<(Option<i64>,)> = sqlx::query_as("SELECT request_id FROM audit_logs")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].0.is_none(), "FK should null out, not cascade");
}
