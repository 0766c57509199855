//! `/options`, `/health`, request tracing and CORS tests

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use serde_json::Value;

use roomdream::api::middleware::RequestTrace;
use roomdream::api::services::{AppStartTime, health_routes, options_routes};
use roomdream::config::CorsConfig;
use roomdream::errors::{Result, RoomDreamError};
use roomdream::ratelimit::{FixedWindow, MemoryRateLimiter, NullRateLimiter, RateLimiter};
use roomdream::runtime::modes::server::{build_app, build_cors_middleware};
use roomdream::services::prediction::{Prediction, PredictionRequest};
use roomdream::services::{GenerationService, GenerationSettings, PredictionApi};

struct StaticApi {
    configured: bool,
}

#[async_trait]
impl PredictionApi for StaticApi {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create(&self, _request: &PredictionRequest) -> Result<Prediction> {
        Err(RoomDreamError::transport("not used"))
    }

    async fn fetch(&self, _url: &str) -> Result<Prediction> {
        Err(RoomDreamError::transport("not used"))
    }
}

fn service(configured: bool, limiter: Arc<dyn RateLimiter>) -> Arc<GenerationService> {
    Arc::new(GenerationService::new(
        Arc::new(StaticApi { configured }),
        limiter,
        GenerationSettings::default(),
    ))
}

fn memory_limiter() -> Arc<dyn RateLimiter> {
    Arc::new(MemoryRateLimiter::new(
        FixedWindow::new(10, Duration::from_secs(12 * 3600)),
        "test",
    ))
}

// =============================================================================
// /options
// =============================================================================

#[actix_rt::test]
async fn test_options_lists_catalog_and_limit() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service(true, memory_limiter())))
            .service(options_routes()),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/options").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["themes"][0], "Modern");
    assert!(
        body["rooms"]
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r == "Gaming Room")
    );
    assert_eq!(body["defaultRoom"], "Living Room");
    assert_eq!(body["rateLimit"]["limit"], 10);
    assert_eq!(body["rateLimit"]["windowHours"], 12);
    assert_eq!(body["rateLimit"]["backend"], "memory");
}

#[actix_rt::test]
async fn test_options_without_limiter() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service(true, Arc::new(NullRateLimiter))))
            .service(options_routes()),
    )
    .await;

    let body: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/options").to_request()).await;
    assert!(body["rateLimit"].is_null());
}

// =============================================================================
// /health
// =============================================================================

#[actix_rt::test]
async fn test_health_ok_when_configured() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service(true, memory_limiter())))
            .app_data(web::Data::new(AppStartTime::now()))
            .service(health_routes()),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["prediction_api_configured"], true);
    assert_eq!(body["rate_limiter"]["backend"], "memory");
}

#[actix_rt::test]
async fn test_health_unavailable_without_api_key() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service(false, memory_limiter())))
            .app_data(web::Data::new(AppStartTime::now()))
            .service(health_routes()),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
}

#[actix_rt::test]
async fn test_liveness_is_204() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service(false, memory_limiter())))
            .app_data(web::Data::new(AppStartTime::now()))
            .service(health_routes()),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health/live").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// =============================================================================
// Request tracing
// =============================================================================

#[actix_rt::test]
async fn test_request_id_header_is_set() {
    let app = test::init_service(
        App::new()
            .wrap(RequestTrace)
            .app_data(web::Data::new(service(true, memory_limiter())))
            .service(options_routes()),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/options").to_request()).await;
    let id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(!id.is_empty());

    let req = TestRequest::get()
        .uri("/options")
        .insert_header(("x-request-id", "upstream-abc-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "upstream-abc-123");
}

// =============================================================================
// CORS
// =============================================================================

#[actix_rt::test]
async fn test_cors_allows_configured_origin() {
    let cors = CorsConfig {
        enabled: true,
        allowed_origins: vec!["https://dream.example.com".to_string()],
        max_age: 600,
    };
    let app = test::init_service(
        App::new()
            .wrap(build_cors_middleware(&cors))
            .app_data(web::Data::new(service(true, memory_limiter())))
            .service(options_routes()),
    )
    .await;

    let req = TestRequest::get()
        .uri("/options")
        .insert_header((header::ORIGIN, "https://dream.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://dream.example.com"
    );
}

#[actix_rt::test]
async fn test_cors_disabled_adds_no_allow_origin() {
    let app = test::init_service(
        App::new()
            .wrap(build_cors_middleware(&CorsConfig::default()))
            .app_data(web::Data::new(service(true, memory_limiter())))
            .service(options_routes()),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/options").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[actix_rt::test]
async fn test_cors_preflight_is_traced() {
    let cors = CorsConfig {
        enabled: true,
        allowed_origins: vec!["https://dream.example.com".to_string()],
        max_age: 600,
    };
    let app = test::init_service(build_app(
        service(true, memory_limiter()),
        AppStartTime::now(),
        cors,
        64 * 1024,
    ))
    .await;

    let req = TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/generate")
        .insert_header((header::ORIGIN, "https://dream.example.com"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://dream.example.com"
    );
    let id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(!id.is_empty());
}

#[actix_rt::test]
async fn test_full_app_routes_and_headers() {
    let app = test::init_service(build_app(
        service(true, memory_limiter()),
        AppStartTime::now(),
        CorsConfig::default(),
        64 * 1024,
    ))
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/options").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
}
