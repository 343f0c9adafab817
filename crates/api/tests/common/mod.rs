#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fondant_api::config::ServerConfig;
use fondant_api::idempotency::IdempotencyGuard;
use fondant_api::router::build_app_router;
use fondant_api::state::AppState;
use fondant_core::density::Density;
use fondant_core::style::StyleIntensity;
use fondant_core::types::DbId;
use fondant_db::models::reference_image::{CreateReferenceImage, ReferenceAnalysis};
use fondant_db::models::request::{CreateRequest, Request as DbRequest};
use fondant_db::models::size_category::CreateSizeCategory;
use fondant_db::models::style_pack::CreateStylePack;
use fondant_db::repositories::{
    ReferenceImageRepo, RequestRepo, SizeCategoryRepo, StylePackRepo,
};
use fondant_pipeline::{GenerationPipeline, PipelineConfig};
use fondant_vision::MockCapability;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, backed by
/// a fresh scripted capability.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, &Arc::new(MockCapability::new()))
}

/// Build the full application router around the given scripted capability,
/// so tests can steer and inspect vision calls.
pub fn build_test_app_with(pool: PgPool, mock: &Arc<MockCapability>) -> Router {
    let config = test_config();
    let pipeline = GenerationPipeline::new(pool.clone(), mock.clone(), PipelineConfig::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline: Arc::new(pipeline),
        idempotency: Arc::new(IdempotencyGuard::new()),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request to the router and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a bodyless POST request to the router.
pub async fn post(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body to the router.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

fn navy_pack(name: &str) -> CreateStylePack {
    CreateStylePack {
        name: name.to_string(),
        palette: serde_json::json!([
            {"hex": "#000080", "ratio": 0.6},
            {"hex": "#FFFFFF", "ratio": 0.4},
        ]),
        allowed_decorations: vec!["sugar flowers".to_string()],
        banned_terms: vec![],
        palette_lock_strength: 0.95,
        intensity: StyleIntensity::default(),
        shape_template: None,
        trend_keywords: vec![],
        trend_techniques: vec![],
    }
}

fn three_tier_size(name: &str) -> CreateSizeCategory {
    CreateSizeCategory {
        name: name.to_string(),
        tier_count: 3,
        serves_min: 40,
        serves_max: 80,
        price_min_cents: 20_000,
        price_max_cents: 40_000,
        default_shape: None,
    }
}

fn mid_density_analysis() -> ReferenceAnalysis {
    ReferenceAnalysis {
        palette: serde_json::json!([
            {"hex": "#000080", "ratio": 0.5},
            {"hex": "#FFFFFF", "ratio": 0.5},
        ]),
        texture_tags: vec!["smooth fondant".to_string()],
        density_id: Density::Mid.id(),
        embedding: Some(vec![0.2, 0.4, 0.6, 0.8]),
    }
}

/// Create a pack with `analyzed` analyzed references plus a size category.
pub async fn seed_catalog(pool: &PgPool, tag: &str, analyzed: usize) -> (DbId, DbId) {
    let pack = StylePackRepo::create(pool, &navy_pack(&format!("Pack {tag}")))
        .await
        .unwrap();
    let size = SizeCategoryRepo::create(pool, &three_tier_size(&format!("Size {tag}")))
        .await
        .unwrap();
    for i in 0..analyzed {
        let storage_key = format!("packs/{}/ref-{i}.jpg", pack.id);
        ReferenceImageRepo::create_pending(
            pool,
            &CreateReferenceImage {
                style_pack_id: pack.id,
                storage_key: storage_key.clone(),
            },
        )
        .await
        .unwrap();
        ReferenceImageRepo::upsert_analysis(pool, pack.id, &storage_key, &mid_density_analysis())
            .await
            .unwrap();
    }
    (pack.id, size.id)
}

/// Insert a request directly, bypassing the HTTP layer.
pub async fn seed_request(
    pool: &PgPool,
    style_pack_id: DbId,
    size_category_id: DbId,
    brief: Option<&str>,
) -> DbRequest {
    RequestRepo::create(
        pool,
        &CreateRequest {
            style_pack_id,
            size_category_id,
            brief: brief.map(str::to_string),
            customer_name: "Test Customer".to_string(),
            customer_email: "customer@example.com".to_string(),
        },
    )
    .await
    .unwrap()
    .expect("Active pack and category should allow creation")
}
