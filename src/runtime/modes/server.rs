//! Server mode
//!
//! Configures and starts the HTTP server with all routes.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::RequestTrace;
use crate::api::services::{AppStartTime, generate_routes, health_routes, options_routes};
use crate::config::{CorsConfig, get_config};
use crate::runtime::lifetime;
use crate::services::GenerationService;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if cors_config.enabled && cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }
}

/// Build CORS middleware from configuration
///
/// The page that uploads photos usually lives on another origin than this
/// service, so origins are configurable. Only GET/POST are needed.
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // When CORS is disabled, use browser's default same-origin policy (restrictive)
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .allowed_header("X-Request-ID")
        .expose_headers(vec!["X-Request-ID"])
        .max_age(cors_config.max_age as usize);

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Assemble the application with all routes and middleware
///
/// RequestTrace is registered last so it is the outermost layer: CORS
/// preflights and rejections still get a span and an `X-Request-ID`.
pub fn build_app(
    generation: Arc<GenerationService>,
    app_start_time: AppStartTime,
    cors_config: CorsConfig,
    max_body_bytes: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
        .wrap(Compress::default())
        .wrap(build_cors_middleware(&cors_config))
        .wrap(RequestTrace)
        .app_data(web::Data::new(generation))
        .app_data(web::Data::new(app_start_time))
        .app_data(web::PayloadConfig::new(max_body_bytes))
        .service(generate_routes())
        .service(options_routes())
        .service(health_routes())
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();
    let config = get_config();

    let startup = lifetime::startup::prepare_server_startup(&config).map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;
    let generation = startup.generation;

    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let max_body_bytes = config.server.max_body_bytes;
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let server = HttpServer::new(move || {
        build_app(
            generation.clone(),
            app_start_time.clone(),
            cors_config.clone(),
            max_body_bytes,
        )
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
