//! HTTP-level integration tests for request intake, proposal generation,
//! tracking, and selection.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener. Generation runs against a scripted
//! capability, so no external services are involved.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, post, post_json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use fondant_db::models::proposal::CreateProposal;
use fondant_db::repositories::ProposalRepo;
use fondant_vision::MockCapability;

// ---------------------------------------------------------------------------
// Request intake
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_request_returns_201(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "create", 2).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/requests",
        serde_json::json!({
            "style_pack_id": pack_id,
            "size_category_id": size_id,
            "brief": "lemon and lavender",
            "customer_name": "Miriam",
            "customer_email": "miriam@example.com",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["data"]["id"].is_number());
    // New requests start in the Generating status.
    assert_eq!(json["data"]["status_id"], 1);
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["brief"], "lemon and lavender");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_request_with_unknown_pack_returns_400(pool: PgPool) {
    let (_, size_id) = common::seed_catalog(&pool, "nopack", 2).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/requests",
        serde_json::json!({
            "style_pack_id": 999_999,
            "size_category_id": size_id,
            "customer_name": "Miriam",
            "customer_email": "miriam@example.com",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_request_without_contact_returns_422(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "nocontact", 2).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/requests",
        serde_json::json!({
            "style_pack_id": pack_id,
            "size_category_id": size_id,
            "brief": "lemon and lavender",
        }),
    )
    .await;

    // The Json extractor rejects the payload before the handler runs.
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Proposal generation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generate_returns_ranked_proposals(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "gen", 2).await;
    let request = common::seed_request(&pool, pack_id, size_id, Some("pink roses")).await;
    let mock = Arc::new(MockCapability::new());

    let app = common::build_test_app_with(pool.clone(), &mock);
    let response = post(app, &format!("/api/v1/requests/{}/proposals", request.id)).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let proposals = json["data"].as_array().unwrap();
    assert_eq!(proposals.len(), 3);
    for proposal in proposals {
        let rank = proposal["rank_score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&rank));
        assert_eq!(proposal["request_id"].as_i64(), Some(request.id));
    }

    // 3 variants x 2 draft candidates, then 3 refinements.
    assert_eq!(mock.generate_calls(), 9);

    // The persisted rows read back through the list endpoint.
    let app = common::build_test_app_with(pool, &mock);
    let response = get(app, &format!("/api/v1/requests/{}/proposals", request.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generate_for_unknown_request_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post(app, "/api/v1/requests/999999/proposals").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generate_with_one_reference_returns_422(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "thin", 1).await;
    let request = common::seed_request(&pool, pack_id, size_id, Some("berry garland")).await;

    let app = common::build_test_app(pool.clone());
    let response = post(app, &format!("/api/v1/requests/{}/proposals", request.id)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PRECONDITION_FAILED");

    // The customer-facing surface reads back as failed, nothing more.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/track/{}", request.access_token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "failed");
    assert_eq!(json["data"]["proposals"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generate_twice_returns_same_proposals(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "again", 2).await;
    let request = common::seed_request(&pool, pack_id, size_id, Some("pink roses")).await;
    let mock = Arc::new(MockCapability::new());

    let app = common::build_test_app_with(pool.clone(), &mock);
    let first = body_json(post(app, &format!("/api/v1/requests/{}/proposals", request.id)).await).await;
    let calls_after_first = mock.generate_calls();

    let app = common::build_test_app_with(pool, &mock);
    let second =
        body_json(post(app, &format!("/api/v1/requests/{}/proposals", request.id)).await).await;

    // Existing proposals are returned as-is, without touching the capability.
    assert_eq!(mock.generate_calls(), calls_after_first);
    let first_ids: Vec<i64> = first["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    let second_ids: Vec<i64> = second["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(first_ids, second_ids);
}

// ---------------------------------------------------------------------------
// Idempotency header
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_idempotency_header_returns_400(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "badkey", 2).await;
    let request = common::seed_request(&pool, pack_id, size_id, None).await;

    let app = common::build_test_app(pool);
    let http_request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/requests/{}/proposals", request.id))
        .header("x-idempotency-key", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(http_request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_idempotency_key_conflicts_while_in_flight(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "dupe", 2).await;
    let request = common::seed_request(&pool, pack_id, size_id, Some("pink roses")).await;
    let mock = Arc::new(MockCapability::new());

    // Both calls must share the router (and therefore the guard).
    let app = common::build_test_app_with(pool, &mock);
    let key = Uuid::new_v4().to_string();
    let build = |app: axum::Router| {
        let uri = format!("/api/v1/requests/{}/proposals", request.id);
        let key = key.clone();
        async move {
            let http_request = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header("x-idempotency-key", key)
                .body(Body::empty())
                .unwrap();
            app.oneshot(http_request).await.unwrap()
        }
    };

    let (first, second) = tokio::join!(build(app.clone()), build(app));

    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    // Only the winning call ran the pipeline.
    assert_eq!(mock.generate_calls(), 9);
}

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_returns_request_and_proposals(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "track", 2).await;
    let request = common::seed_request(&pool, pack_id, size_id, Some("pink roses")).await;

    let app = common::build_test_app(pool.clone());
    post(app, &format!("/api/v1/requests/{}/proposals", request.id)).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/track/{}", request.access_token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ready");
    assert_eq!(json["data"]["request"]["id"].as_i64(), Some(request.id));
    assert_eq!(json["data"]["proposals"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_unknown_token_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/track/{}", Uuid::new_v4())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_select_marks_single_proposal(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "select", 2).await;
    let request = common::seed_request(&pool, pack_id, size_id, Some("pink roses")).await;

    let app = common::build_test_app(pool.clone());
    let generated =
        body_json(post(app, &format!("/api/v1/requests/{}/proposals", request.id)).await).await;
    let proposals = generated["data"].as_array().unwrap();
    let first_id = proposals[0]["id"].as_i64().unwrap();
    let second_id = proposals[1]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post(app, &format!("/api/v1/proposals/{first_id}/select")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_selected"], true);

    // Changing the pick un-marks the first proposal.
    let app = common::build_test_app(pool.clone());
    let response = post(app, &format!("/api/v1/proposals/{second_id}/select")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let listed =
        body_json(get(app, &format!("/api/v1/requests/{}/proposals", request.id)).await).await;
    let selected: Vec<i64> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["is_selected"] == true)
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(selected, vec![second_id]);

    let app = common::build_test_app(pool);
    let tracked = body_json(get(app, &format!("/api/v1/track/{}", request.access_token)).await).await;
    assert_eq!(tracked["data"]["status"], "selected");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_select_while_generating_returns_409(pool: PgPool) {
    let (pack_id, size_id) = common::seed_catalog(&pool, "early", 2).await;
    let request = common::seed_request(&pool, pack_id, size_id, None).await;

    // A proposal row on a still-Generating request (mid-pipeline state).
    let rows = ProposalRepo::create_batch(
        &pool,
        &[CreateProposal {
            request_id: request.id,
            variant_id: 1,
            image_key: "data:image/png;base64,AAAA".to_string(),
            prompt: "a cake".to_string(),
            negative_prompt: "blurry".to_string(),
            seed: 7,
            stage: 1,
            scores: serde_json::json!({}),
            rank_score: 0.5,
            price_min_cents: 20_000,
            price_max_cents: 40_000,
            badges: vec![],
        }],
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool);
    let response = post(app, &format!("/api/v1/proposals/{}/select", rows[0].id)).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_select_unknown_proposal_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post(app, "/api/v1/proposals/999999/select").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
